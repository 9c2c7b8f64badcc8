//! Database migration runner for Haulbook.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-apply migrations
//!
//! The connection string comes from `DATABASE_URL`.

use sea_orm_migration::prelude::*;
use haulbook_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
