//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;
use z3_bridge::SolverError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bridge error: {0}")]
    Bridge(#[from] SolverError),
    #[error("scenario {scenario}: {message}")]
    Scenario {
        scenario: &'static str,
        message: String,
    },
    #[error("{}: {errors} invalid log record(s)", path.display())]
    InvalidLog { path: PathBuf, errors: usize },
}

impl HarnessError {
    pub(crate) fn scenario(scenario: &'static str, message: impl Into<String>) -> Self {
        Self::Scenario {
            scenario,
            message: message.into(),
        }
    }
}
