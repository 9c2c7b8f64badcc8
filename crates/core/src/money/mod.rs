//! Payment status calculation.
//!
//! Client accounts and invoices share this calculator so the two ledgers can
//! never disagree about what "paid" means.

pub mod status;

#[cfg(test)]
mod status_props;

pub use status::{PaymentStatus, Settlement, compute_due, compute_status};
