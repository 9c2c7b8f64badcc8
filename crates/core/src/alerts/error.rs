//! Alert evaluation errors.

use haulbook_shared::AppError;
use thiserror::Error;

use crate::access::AccessDenied;

/// Errors raised while evaluating alert rules.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The rules file could not be read.
    #[error("Alert rules unavailable: {0}")]
    RulesUnavailable(String),

    /// The rules file is malformed.
    #[error("Invalid alert rules: {0}")]
    InvalidRules(String),

    /// The actor lacks the required capability.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// Storage timed out or was busy; safe to retry.
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AlertError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "PERMISSION_DENIED",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::RulesUnavailable(_) | Self::InvalidRules(_) | Self::Database(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::Transient(_) => 503,
            Self::RulesUnavailable(_) | Self::InvalidRules(_) | Self::Database(_) => 500,
        }
    }
}

impl From<AlertError> for AppError {
    fn from(err: AlertError) -> Self {
        let message = err.to_string();
        match err {
            AlertError::Forbidden(_) => Self::Forbidden(message),
            AlertError::Transient(_) => Self::Transient(message),
            AlertError::RulesUnavailable(_) | AlertError::InvalidRules(_) | AlertError::Database(_) => {
                Self::Internal(message)
            }
        }
    }
}
