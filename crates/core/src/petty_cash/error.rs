//! Petty cash error types.

use haulbook_shared::{AppError, types::AmountError};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use super::types::ApprovalStatus;
use crate::access::AccessDenied;

/// Which float bound a movement would breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// An outflow larger than the current balance.
    AvailableFloat,
    /// An inflow pushing the balance over `max_limit`.
    MaxLimit,
    /// Approved outflow for the day would exceed `daily_limit`.
    DailyLimit,
    /// Approved outflow for the month would exceed `monthly_limit`.
    MonthlyLimit,
}

impl LimitKind {
    /// Returns the name reported to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AvailableFloat => "available_float",
            Self::MaxLimit => "max_limit",
            Self::DailyLimit => "daily_limit",
            Self::MonthlyLimit => "monthly_limit",
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the petty cash engine.
#[derive(Debug, Error)]
pub enum PettyCashError {
    // ========== Validation Errors ==========
    /// Required fields absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// An amount failed to parse.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Entry amount is zero.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// A date is not `YYYY-MM-DD`.
    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate {
        /// The offending field.
        field: &'static str,
        /// The raw input.
        value: String,
    },

    /// Unknown movement direction.
    #[error("transaction_type must be 'in' or 'out', got '{0}'")]
    InvalidEntryType(String),

    /// Attachment reference has the wrong shape.
    #[error("receipt_attachment {0}")]
    InvalidAttachment(&'static str),

    /// Category unknown or inactive.
    #[error("Category does not exist or is inactive")]
    InvalidCategory,

    /// Category name blank or too long.
    #[error("Category name must be 1 to 100 characters")]
    InvalidCategoryName,

    /// Settings values are inconsistent.
    #[error("Invalid float settings: {0}")]
    InvalidSettings(String),

    /// `approval_threshold > max_limit` under the reject policy.
    #[error("approval_threshold {approval_threshold} exceeds max_limit {max_limit}")]
    ThresholdOrder {
        /// The requested approval threshold.
        approval_threshold: Decimal,
        /// The requested ceiling.
        max_limit: Decimal,
    },

    /// No settings version governs the instant.
    #[error("Petty cash float settings have not been configured")]
    SettingsNotConfigured,

    /// Amount, type, or date changed on a decided entry.
    #[error("amount, transaction_type, and transaction_date can only change while the entry is pending")]
    FinancialFieldsFrozen,

    /// Rejection without a reason.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// The entry has already been decided.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ApprovalStatus,
        /// Attempted status.
        to: ApprovalStatus,
    },

    // ========== Permission Errors ==========
    /// The creator tried to decide their own entry.
    #[error("Entries cannot be approved or rejected by their creator")]
    SelfApproval,

    /// The actor lacks the required capability.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    // ========== State Errors ==========
    /// The entry is locked.
    #[error("Petty cash entry is locked")]
    Locked,

    /// A float or period limit would be breached.
    #[error("{kind} of {limit} would be exceeded by {amount}")]
    LimitExceeded {
        /// Which bound.
        kind: LimitKind,
        /// The bound's value.
        limit: Decimal,
        /// The movement amount.
        amount: Decimal,
    },

    // ========== Lookup Errors ==========
    /// Entry absent or owned by someone else.
    #[error("Petty cash entry not found")]
    EntryNotFound,

    /// Category absent.
    #[error("Category not found")]
    CategoryNotFound,

    /// Category name taken.
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    // ========== Storage Errors ==========
    /// Storage timed out or was busy; safe to retry.
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PettyCashError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SelfApproval | Self::Forbidden(_) => "PERMISSION_DENIED",
            Self::Locked => "LOCKED",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::EntryNotFound | Self::CategoryNotFound => "NOT_FOUND",
            Self::DuplicateCategory(_) => "CONFLICT",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Database(_) => "INTERNAL_ERROR",
            _ => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SelfApproval | Self::Forbidden(_) => 403,
            Self::Locked => 423,
            Self::LimitExceeded { .. } => 422,
            Self::EntryNotFound | Self::CategoryNotFound => 404,
            Self::DuplicateCategory(_) => 409,
            Self::Transient(_) => 503,
            Self::Database(_) => 500,
            _ => 400,
        }
    }
}

impl From<PettyCashError> for AppError {
    fn from(err: PettyCashError) -> Self {
        let message = err.to_string();
        match err {
            PettyCashError::SelfApproval | PettyCashError::Forbidden(_) => Self::Forbidden(message),
            PettyCashError::Locked => Self::Locked(message),
            PettyCashError::LimitExceeded { kind, .. } => Self::LimitExceeded {
                limit: kind.as_str().to_string(),
                message,
            },
            PettyCashError::EntryNotFound | PettyCashError::CategoryNotFound => {
                Self::NotFound(message)
            }
            PettyCashError::DuplicateCategory(_) => Self::Conflict(message),
            PettyCashError::Transient(_) => Self::Transient(message),
            PettyCashError::Database(_) => Self::Internal(message),
            _ => Self::Validation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_exceeded_names_the_limit() {
        let err = PettyCashError::LimitExceeded {
            kind: LimitKind::DailyLimit,
            limit: dec!(500.00),
            amount: dec!(120.00),
        };
        assert_eq!(err.to_string(), "daily_limit of 500.00 would be exceeded by 120.00");
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 422);
        assert_eq!(app.limit(), Some("daily_limit"));
    }

    #[test]
    fn test_self_approval_is_permission_error() {
        let app: AppError = PettyCashError::SelfApproval.into();
        assert_eq!(app.error_code(), "PERMISSION_DENIED");
        assert_eq!(PettyCashError::SelfApproval.status_code(), 403);
    }

    #[test]
    fn test_locked_maps_to_423() {
        assert_eq!(PettyCashError::Locked.status_code(), 423);
        let app: AppError = PettyCashError::Locked.into();
        assert_eq!(app.error_code(), "LOCKED");
    }

    #[test]
    fn test_validation_fallthrough() {
        assert_eq!(PettyCashError::FinancialFieldsFrozen.status_code(), 400);
        assert_eq!(
            PettyCashError::RejectionReasonRequired.error_code(),
            "VALIDATION_ERROR"
        );
    }
}
