//! Simulation inputs: raw values from the caller and their normalized form

mod inputs;
pub mod loader;

pub use inputs::{IncomeBreakdown, RawInputs, SimulationParameters, AFP_RATE, EXPENSE_CLAMP_RATIO};
pub use loader::{load_profile, load_profile_from_reader};
