//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - A portable schema migration (PostgreSQL in production, SQLite in tests)
//! - Repositories that run every ledger mutation in a single transaction
//! - Classification of storage failures into transient and fatal kinds

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod storage;

pub use repositories::{
    AlertRepository, AppliedReceipt, AuditRepository, CategoryRepository, ClientRepository,
    ClientUpdate, EntryFilter, EvaluationReport, FloatSettingsRepository, ImportSummary,
    InvoiceRepository, NotificationRepository, NotificationView, PettyCashRepository,
    RaisedAlert, TransactionRepository,
};
pub use storage::StorageError;

use std::time::Duration;

use haulbook_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection using the configured limits.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);

    tracing::info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Connecting to database"
    );
    Database::connect(options).await
}
