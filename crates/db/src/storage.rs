//! Storage failure classification.
//!
//! Every `DbErr` is sorted into one of three kinds before it reaches a
//! module error: transient (pool exhausted, timeout, lock or serialization
//! failure), conflict (a unique constraint lost a race), or fatal. Transient
//! failures surface to callers as retryable.

use haulbook_core::alerts::AlertError;
use haulbook_core::ledger::LedgerError;
use haulbook_core::notification::NotificationError;
use haulbook_core::petty_cash::PettyCashError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// SQLSTATEs PostgreSQL uses for conditions a retry can clear.
const TRANSIENT_SQLSTATES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "57014", // query_canceled (statement_timeout)
    "53300", // too_many_connections
];

/// SQLite result codes for a busy or locked database, primary and extended.
const SQLITE_BUSY_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// A classified storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The operation may succeed if retried.
    #[error("storage temporarily unavailable: {0}")]
    Transient(String),

    /// A unique constraint rejected the write.
    #[error("constraint violated: {0}")]
    Conflict(String),

    /// Anything else.
    #[error("storage failure: {0}")]
    Fatal(String),
}

impl StorageError {
    /// Returns true for failures that a retry may clear.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        let classified = classify(&err);
        match &classified {
            Self::Transient(msg) => tracing::warn!(error = %msg, "Transient storage failure"),
            Self::Conflict(msg) => tracing::warn!(error = %msg, "Storage constraint conflict"),
            Self::Fatal(msg) => tracing::error!(error = %msg, "Storage failure"),
        }
        classified
    }
}

/// Sorts a `DbErr` into transient, conflict, or fatal.
#[must_use]
pub fn classify(err: &DbErr) -> StorageError {
    let message = err.to_string();

    if matches!(err, DbErr::ConnectionAcquire(_)) {
        return StorageError::Transient(message);
    }
    if is_unique_violation(err) {
        return StorageError::Conflict(message);
    }

    match sqlx_error(err) {
        Some(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => StorageError::Transient(message),
        Some(sqlx::Error::Database(db)) => {
            let transient = db.code().is_some_and(|code| {
                TRANSIENT_SQLSTATES.contains(&code.as_ref())
                    || SQLITE_BUSY_CODES.contains(&code.as_ref())
            });
            if transient {
                StorageError::Transient(message)
            } else {
                StorageError::Fatal(message)
            }
        }
        _ if matches!(err, DbErr::Conn(_)) => StorageError::Transient(message),
        _ => StorageError::Fatal(message),
    }
}

/// Returns true if `err` is a unique constraint violation.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn sqlx_error(err: &DbErr) -> Option<&sqlx::Error> {
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => Some(e),
        _ => None,
    }
}

// A conflict that reaches these conversions was not anticipated by the
// repository, so it can only be a lost race with a concurrent writer.

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Transient(msg) | StorageError::Conflict(msg) => Self::Transient(msg),
            StorageError::Fatal(msg) => Self::Database(msg),
        }
    }
}

impl From<StorageError> for PettyCashError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Transient(msg) | StorageError::Conflict(msg) => Self::Transient(msg),
            StorageError::Fatal(msg) => Self::Database(msg),
        }
    }
}

impl From<StorageError> for NotificationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Transient(msg) | StorageError::Conflict(msg) => Self::Transient(msg),
            StorageError::Fatal(msg) => Self::Database(msg),
        }
    }
}

impl From<StorageError> for AlertError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Transient(msg) | StorageError::Conflict(msg) => Self::Transient(msg),
            StorageError::Fatal(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnAcquireErr;

    #[test]
    fn test_pool_exhaustion_is_transient() {
        let err = DbErr::ConnectionAcquire(ConnAcquireErr::Timeout);
        assert!(classify(&err).is_transient());
    }

    #[test]
    fn test_sqlx_pool_timeout_is_transient() {
        let err = DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::PoolTimedOut));
        assert!(classify(&err).is_transient());
    }

    #[test]
    fn test_custom_errors_are_fatal() {
        let err = DbErr::Custom("bad row".into());
        assert!(matches!(classify(&err), StorageError::Fatal(_)));
    }

    #[test]
    fn test_not_found_record_is_fatal() {
        let err = DbErr::RecordNotFound("invoice".into());
        assert!(!classify(&err).is_transient());
    }

    #[test]
    fn test_module_conversions_keep_retryability() {
        let err: LedgerError = StorageError::Transient("timeout".into()).into();
        assert!(matches!(err, LedgerError::Transient(_)));

        let err: PettyCashError = StorageError::Fatal("corrupt".into()).into();
        assert!(matches!(err, PettyCashError::Database(_)));
    }
}
