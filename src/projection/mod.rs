//! Savings projection: ODE model, integrator, closed-form annuities and
//! the engine that combines them

mod model;
pub mod integrator;
pub mod annuity;
mod result;
mod engine;

pub use model::{InterestRegime, SavingsModel, BASELINE_RETURN};
pub use integrator::{SolverMethod, StepFailure};
pub use annuity::AnnuityValues;
pub use result::{
    ProjectionResult, ProjectionSummary, ProjectionWarning, RegimeProjection, ScenarioOutcomes,
    DEFICIT_SENTINEL,
};
pub use engine::{ProjectionConfig, ProjectionEngine};
