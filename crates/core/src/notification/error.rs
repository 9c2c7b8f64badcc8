//! Notification error types.

use haulbook_shared::AppError;
use thiserror::Error;

use crate::access::AccessDenied;

/// Errors raised by the notification dispatcher.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Required fields absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Neither or both of `user_id` and `broadcast` given.
    #[error("Specify exactly one of user_id or broadcast")]
    AmbiguousTarget,

    /// Unknown kind.
    #[error("Unknown notification kind '{0}'")]
    InvalidKind(String),

    /// Title longer than allowed.
    #[error("title must be at most 200 characters")]
    TitleTooLong,

    /// Notification absent or addressed to someone else.
    #[error("Notification not found")]
    NotFound,

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

impl NotificationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields(_)
            | Self::AmbiguousTarget
            | Self::InvalidKind(_)
            | Self::TitleTooLong => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden(_) => "PERMISSION_DENIED",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingFields(_)
            | Self::AmbiguousTarget
            | Self::InvalidKind(_)
            | Self::TitleTooLong => 400,
            Self::NotFound => 404,
            Self::Forbidden(_) => 403,
            Self::Transient(_) => 503,
            Self::Database(_) => 500,
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        let message = err.to_string();
        match err {
            NotificationError::MissingFields(_)
            | NotificationError::AmbiguousTarget
            | NotificationError::InvalidKind(_)
            | NotificationError::TitleTooLong => Self::Validation(message),
            NotificationError::NotFound => Self::NotFound(message),
            NotificationError::Forbidden(_) => Self::Forbidden(message),
            NotificationError::Transient(_) => Self::Transient(message),
            NotificationError::Database(_) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        assert_eq!(NotificationError::NotFound.status_code(), 404);
        let app: AppError = NotificationError::NotFound.into();
        assert_eq!(app.public_message(), "Resource not found");
    }
}
