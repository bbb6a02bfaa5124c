//! Expense-domain error types.

use thiserror::Error;

/// Errors that can occur while building or persisting an expense record.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// A required field was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote insert failed. The message carries the backend's own
    /// description so it can be surfaced to the caller verbatim.
    #[error("{0}")]
    Persistence(String),
}

impl ExpenseError {
    /// Create a new "invalid argument" error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

impl From<reqwest::Error> for ExpenseError {
    fn from(err: reqwest::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
