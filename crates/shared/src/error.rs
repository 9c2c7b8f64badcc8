//! Application-wide error types.
//!
//! Every module error in the engine maps into one of these kinds before it
//! crosses the HTTP boundary. The boundary only ever shows
//! [`AppError::public_message`], so not-found and access-denied responses
//! carry no detail about which entity or capability was involved.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No actor could be resolved for the request.
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// The actor lacks a capability.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource absent or not owned by the actor.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mutation attempted on a locked entity.
    #[error("Locked: {0}")]
    Locked(String),

    /// A threshold, float, or period limit was breached.
    #[error("Limit exceeded ({limit}): {message}")]
    LimitExceeded {
        /// Name of the breached limit, e.g. `daily_limit`.
        limit: String,
        /// Human-readable explanation.
        message: String,
    },

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage unavailable or timed out; the caller may retry.
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Locked(_) => 423,
            Self::LimitExceeded { .. } => 422,
            Self::Conflict(_) => 409,
            Self::Transient(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Locked(_) => "LOCKED",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::Conflict(_) => "CONFLICT",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns the breached limit name, if any.
    #[must_use]
    pub fn limit(&self) -> Option<&str> {
        match self {
            Self::LimitExceeded { limit, .. } => Some(limit),
            _ => None,
        }
    }

    /// Returns the message that is safe to show to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Authentication required".to_string(),
            Self::Forbidden(_) => "Access denied".to_string(),
            Self::NotFound(_) => "Resource not found".to_string(),
            Self::Validation(msg) | Self::Locked(msg) | Self::Conflict(msg) => msg.clone(),
            Self::LimitExceeded { message, .. } => message.clone(),
            Self::Transient(_) => "Storage temporarily unavailable, please retry".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}
