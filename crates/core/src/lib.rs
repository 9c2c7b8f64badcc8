//! Core business logic for Haulbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `access` - Actors, capabilities, and the permission checker seam
//! - `money` - Due amount and payment status calculator
//! - `ledger` - Clients, invoices, receipts, and transactions
//! - `petty_cash` - Float limits and the approval state machine
//! - `alerts` - Rule evaluation with edge-triggered semantics
//! - `notification` - Notification kinds and recipients
//! - `audit` - Audit trail records

pub mod access;
pub mod alerts;
pub mod audit;
pub mod ledger;
pub mod money;
pub mod notification;
pub mod petty_cash;
