use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Evaluation modes that are recognised but have no numeric behavior yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Uncertainty-aware prediction with randomised rate constants
    Random,
    /// Closed-form steady state under evenly repeated dosing
    SteadyState,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Random => write!(f, "random"),
            Mode::SteadyState => write!(f, "steady-state"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EsterError {
    /// The identifier is not present in the registry
    #[error("Unknown formulation '{0}'")]
    UnknownFormulation(String),

    /// The requested mode is not supported
    #[error("Unsupported mode: {0} prediction is not implemented")]
    UnsupportedMode(Mode),

    /// The parallel dose sequences differ in length
    #[error(
        "Length mismatch: {doses} doses, {times} dose times and {formulations} formulation ids"
    )]
    LengthMismatch {
        doses: usize,
        times: usize,
        formulations: usize,
    },

    /// A formulation violates the registry invariants
    #[error("Invalid formulation '{id}': {reason}")]
    InvalidFormulation { id: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EsterError {
    /// Create an invalid formulation error
    pub fn invalid_formulation(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormulation {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
