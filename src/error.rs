//! Validation error
//!
//! The only error the normalize/estimate pipeline raises.

use thiserror::Error;

/// Malformed or contradictory profile input.
///
/// Displays as the bare reason so callers can surface it to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Result type for pipeline operations
pub type ValidationResult<T> = Result<T, ValidationError>;
