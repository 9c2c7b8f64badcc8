//! `SeaORM` entity definitions.

pub mod alert_states;
pub mod audit_records;
pub mod clients;
pub mod counters;
pub mod float_settings;
pub mod invoices;
pub mod ledger_transactions;
pub mod notification_reads;
pub mod notifications;
pub mod petty_cash_categories;
pub mod petty_cash_entries;
pub mod receipts;
pub mod sea_orm_active_enums;
