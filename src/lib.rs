//! Savings Projection - monthly savings accumulation under interest-rate
//! and salary-growth assumptions
//!
//! This library provides:
//! - Parameter normalization (AFP deduction, expense clamp, deficit detection)
//! - A behavioral adjustment factor from nine life-situation multipliers
//! - A continuous-time savings model integrated with an adaptive ODE solver
//! - Closed-form ordinary-annuity projections at 0%, 3% and 7%
//! - Batch and sensitivity runs over many parameter sets

pub mod error;
pub mod behavior;
pub mod params;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::SimulationError;
pub use behavior::{AdjustmentFactor, BehavioralProfile, BehavioralVariable};
pub use params::{RawInputs, SimulationParameters};
pub use projection::{InterestRegime, ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionWarning};
pub use scenario::ScenarioRunner;
