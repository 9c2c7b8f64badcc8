//! Client accounts, invoices, receipts, and free-form transactions.
//!
//! - `types` - Boundary inputs and validated records
//! - `validation` - Field rules (required fields, dates, tax ids, amounts)
//! - `history` - Field-level audit diffs for client updates
//! - `service` - Receipt planning and numbering
//! - `error` - Ledger errors

pub mod error;
pub mod history;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use history::{FieldChange, NO_CHANGES, diff_clients, summarize_changes};
pub use service::{LedgerService, RECEIPT_COUNTER};
pub use types::{
    ClientInput, ClientPatch, ClientState, InvoiceInput, NewInvoice, NewTransaction,
    ReceiptInput, ReceiptRequest, TransactionInput,
};
pub use validation::{
    apply_client_patch, parse_date, validate_invoice, validate_new_client, validate_receipt,
    validate_tax_id, validate_transaction,
};
