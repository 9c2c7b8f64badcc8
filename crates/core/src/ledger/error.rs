//! Ledger error types.

use haulbook_shared::{AppError, types::AmountError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::access::AccessDenied;

/// Errors raised by client, invoice, receipt, and transaction operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// One or more required fields were absent or blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// An amount field failed to parse.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// An amount that must be positive was zero.
    #[error("{0} must be greater than zero")]
    NonPositiveAmount(&'static str),

    /// A date field is not `YYYY-MM-DD`.
    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate {
        /// The offending field.
        field: &'static str,
        /// The raw input.
        value: String,
    },

    /// Tax id is not all digits or longer than nine.
    #[error("tax_id must be at most 9 digits")]
    InvalidTaxId,

    /// A field failed a shape check.
    #[error("{field} {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    // ========== Limit Errors ==========
    /// A receipt would pay more than is outstanding.
    #[error("Receipt amount {amount} exceeds outstanding balance {due}")]
    ExceedsOutstanding {
        /// The requested receipt amount.
        amount: Decimal,
        /// The invoice's outstanding amount.
        due: Decimal,
    },

    // ========== Lookup Errors ==========
    /// Client absent.
    #[error("Client account not found")]
    ClientNotFound,

    /// Invoice absent or owned by someone else.
    #[error("Invoice not found")]
    InvoiceNotFound,

    /// Transaction absent or owned by someone else.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// Invoice number already used by this owner.
    #[error("Invoice number '{0}' already exists")]
    DuplicateInvoiceNumber(String),

    /// Registration number already belongs to another client.
    #[error("Registration number '{0}' already exists")]
    DuplicateRegistration(String),

    /// A client import row failed; the whole batch was rolled back.
    #[error("Row {row}: {source}")]
    ImportRow {
        /// One-based row number.
        row: usize,
        /// Why the row failed.
        source: Box<LedgerError>,
    },

    // ========== Access Errors ==========
    /// The actor lacks the required capability.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    // ========== Storage Errors ==========
    /// Storage timed out or was busy; safe to retry.
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ImportRow { source, .. } => source.error_code(),
            Self::MissingFields(_)
            | Self::InvalidAmount(_)
            | Self::NonPositiveAmount(_)
            | Self::InvalidDate { .. }
            | Self::InvalidTaxId
            | Self::InvalidField { .. } => "VALIDATION_ERROR",
            Self::ExceedsOutstanding { .. } => "LIMIT_EXCEEDED",
            Self::ClientNotFound | Self::InvoiceNotFound | Self::TransactionNotFound => {
                "NOT_FOUND"
            }
            Self::DuplicateInvoiceNumber(_) | Self::DuplicateRegistration(_) => "CONFLICT",
            Self::Forbidden(_) => "PERMISSION_DENIED",
            Self::Transient(_) => "TRANSIENT_ERROR",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ImportRow { source, .. } => source.status_code(),
            Self::MissingFields(_)
            | Self::InvalidAmount(_)
            | Self::NonPositiveAmount(_)
            | Self::InvalidDate { .. }
            | Self::InvalidTaxId
            | Self::InvalidField { .. } => 400,
            Self::Forbidden(_) => 403,
            Self::ClientNotFound | Self::InvoiceNotFound | Self::TransactionNotFound => 404,
            Self::DuplicateInvoiceNumber(_) | Self::DuplicateRegistration(_) => 409,
            Self::ExceedsOutstanding { .. } => 422,
            Self::Transient(_) => 503,
            Self::Database(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::MissingFields(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::InvalidDate { .. }
            | LedgerError::InvalidTaxId
            | LedgerError::InvalidField { .. } => Self::Validation(message),
            LedgerError::ExceedsOutstanding { .. } => Self::LimitExceeded {
                limit: "outstanding_balance".to_string(),
                message,
            },
            LedgerError::ClientNotFound
            | LedgerError::InvoiceNotFound
            | LedgerError::TransactionNotFound => Self::NotFound(message),
            LedgerError::DuplicateInvoiceNumber(_) | LedgerError::DuplicateRegistration(_) => {
                Self::Conflict(message)
            }
            LedgerError::ImportRow { source, .. } => match Self::from(*source) {
                Self::Validation(_) => Self::Validation(message),
                Self::Conflict(_) => Self::Conflict(message),
                Self::LimitExceeded { limit, .. } => Self::LimitExceeded { limit, message },
                other => other,
            },
            LedgerError::Forbidden(_) => Self::Forbidden(message),
            LedgerError::Transient(_) => Self::Transient(message),
            LedgerError::Database(_) => Self::Internal(message),
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(err: AccessDenied) -> Self {
        Self::Forbidden(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Capability;
    use haulbook_shared::types::UserId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_fields_message() {
        let err = LedgerError::MissingFields(vec!["date", "item", "amount"]);
        assert_eq!(err.to_string(), "Missing required fields: date, item, amount");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_exceeds_outstanding_maps_to_limit() {
        let err: AppError = LedgerError::ExceedsOutstanding {
            amount: dec!(600),
            due: dec!(400),
        }
        .into();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.limit(), Some("outstanding_balance"));
    }

    #[test]
    fn test_not_found_kinds_share_public_signal() {
        let a: AppError = LedgerError::TransactionNotFound.into();
        let b: AppError = LedgerError::InvoiceNotFound.into();
        assert_eq!(a.error_code(), b.error_code());
        assert_eq!(a.public_message(), b.public_message());
    }

    #[test]
    fn test_import_row_keeps_inner_kind() {
        let err = LedgerError::ImportRow {
            row: 3,
            source: Box::new(LedgerError::InvalidTaxId),
        };
        assert_eq!(err.status_code(), 400);
        let app: AppError = err.into();
        assert_eq!(app.public_message(), "Row 3: tax_id must be at most 9 digits");
    }

    #[test]
    fn test_forbidden_and_transient_mapping() {
        let denied = AccessDenied {
            actor: UserId::new(),
            capability: Capability::EditClient,
        };
        let err: AppError = LedgerError::from(denied).into();
        assert_eq!(err.status_code(), 403);

        let err: AppError = LedgerError::Transient("pool timed out".into()).into();
        assert!(err.is_retryable());
    }
}
