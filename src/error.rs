//! Error types for the savings projection engine

use thiserror::Error;

/// Errors raised by parameter validation, integration and profile loading
///
/// Recoverable numeric conditions (expense clamp, deficit) are not errors;
/// see [`crate::projection::ProjectionWarning`].
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A caller-supplied value is outside its valid domain
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },

    /// The ODE solver could not advance the balance
    #[error("integration failed for {regime} regime at t = {time:.4}: {reason}")]
    IntegrationFailed {
        regime: String,
        time: f64,
        reason: String,
    },

    /// A behavioral profile row named a variable that does not exist
    #[error("unknown behavioral variable `{0}`")]
    UnknownVariable(String),

    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimulationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SimulationError>;
