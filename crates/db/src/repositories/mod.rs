//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Inputs arrive raw; each repository validates them with the core rules
//! before opening a transaction.

pub mod alert;
pub mod audit;
pub mod category;
pub mod client;
mod counter;
pub mod float_settings;
pub mod invoice;
pub mod notification;
pub mod petty_cash;
pub mod transaction;

pub use alert::{AlertRepository, EvaluationReport, RaisedAlert};
pub use audit::AuditRepository;
pub use category::CategoryRepository;
pub use client::{ClientRepository, ClientUpdate, ImportSummary};
pub use float_settings::FloatSettingsRepository;
pub use invoice::{AppliedReceipt, InvoiceRepository};
pub use notification::{NotificationRepository, NotificationView};
pub use petty_cash::{EntryFilter, PettyCashRepository};
pub use transaction::TransactionRepository;

use rust_decimal::Decimal;

/// Rounds a stored amount back to currency precision.
///
/// SQLite keeps decimals as floating point, so values read back can carry
/// representation noise beyond two places.
pub(crate) fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
