use std::time::Duration;

use thiserror::Error;

use crate::browser::BrowserError;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Reasons a scenario stops early.
///
/// `Timeout` and `Assertion` end the current scenario only; the runner records
/// them and moves on to the next scenario with a fresh session.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A condition never held within its deadline
    #[error("timed out after {elapsed:.1?} waiting for {description}")]
    Timeout { description: String, elapsed: Duration },

    /// An explicit expectation did not match what the page shows
    #[error("{message}: expected {expected}, got {actual}")]
    Assertion {
        message: String,
        expected: String,
        actual: String,
    },

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("timeout for '{0}' must be greater than zero")]
    InvalidTimeout(String),

    #[error("no value was recorded under '{0}'")]
    MissingValue(String),

    #[error("no admin transition leads from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl HarnessError {
    pub fn assertion(
        message: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        HarnessError::Assertion {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::Timeout { .. })
    }

    /// Short category name used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Timeout { .. } => "timeout",
            HarnessError::Assertion { .. } => "assertion",
            HarnessError::Browser(_) => "browser",
            HarnessError::InvalidTimeout(_)
            | HarnessError::MissingValue(_)
            | HarnessError::InvalidTransition { .. } => "definition",
        }
    }
}
