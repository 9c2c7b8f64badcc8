//! Shared setup for the SQLite-backed integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use haulbook_core::petty_cash::SettingsInput;
use haulbook_db::migration::{Migrator, MigratorTrait};
use haulbook_shared::types::RawAmount;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// A fresh, migrated in-memory database.
///
/// One pooled connection keeps the in-memory database alive and makes
/// concurrent callers queue for it, as row locks would on PostgreSQL.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// A migrated file-backed database with a pool of `connections`, so callers
/// really run side by side. The file lives in the system temp directory.
pub async fn setup_pooled(connections: u32) -> DatabaseConnection {
    let path = std::env::temp_dir().join(format!("haulbook-{}.db", uuid::Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open database file");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn amount(raw: &str) -> Option<RawAmount> {
    Some(RawAmount::from(raw))
}

/// Settings input with the four required amounts and no period caps.
pub fn settings(initial: &str, max: &str, replenish: &str, approval: &str) -> SettingsInput {
    SettingsInput {
        initial_float: amount(initial),
        max_limit: amount(max),
        replenishment_threshold: amount(replenish),
        approval_threshold: amount(approval),
        ..Default::default()
    }
}
