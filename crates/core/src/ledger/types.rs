//! Ledger domain types.
//!
//! `*Input` types are what the boundary deserializes: every field optional,
//! amounts still raw. Validation in [`super::validation`] turns them into the
//! checked `New*` / state types the store persists.

use chrono::NaiveDate;
use haulbook_shared::types::{CurrencyCode, RawAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{PaymentStatus, Settlement};

/// Raw fields for a free-form ledger transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionInput {
    /// Transaction type, e.g. `expense` or `income`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Transaction date (`YYYY-MM-DD`).
    pub date: Option<String>,
    /// What was bought or sold.
    pub item: Option<String>,
    /// Service line, e.g. `freight`.
    pub service: Option<String>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Amount.
    pub amount: Option<RawAmount>,
    /// Currency code.
    pub currency: Option<String>,
    /// Free-form status label.
    pub status: Option<String>,
}

/// A validated transaction ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Transaction type.
    pub kind: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Item description.
    pub item: String,
    /// Service line.
    pub service: Option<String>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Amount.
    pub amount: Decimal,
    /// Currency.
    pub currency: CurrencyCode,
    /// Status label.
    pub status: String,
}

/// Raw fields for creating a client account, also used for import rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientInput {
    /// Client name.
    pub name: Option<String>,
    /// Company registration number; the natural key for import.
    pub registration_number: Option<String>,
    /// Person responsible for the account.
    pub responsible_party: Option<String>,
    /// Tax id, all digits.
    pub tax_id: Option<String>,
    /// Currency code.
    pub currency: Option<String>,
    /// Amount invoiced.
    pub amount: Option<RawAmount>,
    /// Amount received.
    pub paid_amount: Option<RawAmount>,
}

/// Field-level changes to a client account. Absent fields are left alone.
///
/// An empty `responsible_party` or `tax_id` string clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPatch {
    /// New name.
    pub name: Option<String>,
    /// New registration number.
    pub registration_number: Option<String>,
    /// New responsible party.
    pub responsible_party: Option<String>,
    /// New tax id.
    pub tax_id: Option<String>,
    /// New currency.
    pub currency: Option<String>,
    /// New invoiced amount.
    pub amount: Option<RawAmount>,
    /// New received amount.
    pub paid_amount: Option<RawAmount>,
}

impl ClientPatch {
    /// Returns a patch that overwrites every field carried by `input`.
    #[must_use]
    pub fn from_input(input: &ClientInput) -> Self {
        Self {
            name: input.name.clone(),
            registration_number: input.registration_number.clone(),
            responsible_party: input.responsible_party.clone(),
            tax_id: input.tax_id.clone(),
            currency: input.currency.clone(),
            amount: input.amount.clone(),
            paid_amount: input.paid_amount.clone(),
        }
    }
}

/// The persisted, comparable state of a client account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientState {
    /// Client name.
    pub name: String,
    /// Registration number.
    pub registration_number: String,
    /// Responsible party.
    pub responsible_party: Option<String>,
    /// Tax id.
    pub tax_id: Option<String>,
    /// Currency.
    pub currency: CurrencyCode,
    /// Amount invoiced.
    pub amount: Decimal,
    /// Amount received.
    pub paid_amount: Decimal,
    /// Outstanding amount.
    pub due_amount: Decimal,
    /// Payment status.
    pub status: PaymentStatus,
}

impl ClientState {
    /// Recomputes `due_amount` and `status` from the amounts.
    #[must_use]
    pub fn settled(mut self) -> Self {
        let s = Settlement::of(self.amount, self.paid_amount);
        self.due_amount = s.due;
        self.status = s.status;
        self
    }
}

/// Raw fields for creating an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceInput {
    /// Invoice number, unique per owner.
    pub invoice_number: Option<String>,
    /// Invoice total.
    pub total: Option<RawAmount>,
    /// Issue date (`YYYY-MM-DD`), defaults to today.
    pub issue_date: Option<String>,
    /// Due date (`YYYY-MM-DD`).
    pub due_date: Option<String>,
}

/// A validated invoice ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    /// Invoice number.
    pub invoice_number: String,
    /// Invoice total.
    pub total: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
}

/// Raw fields for applying a receipt.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptInput {
    /// Number of the invoice being paid.
    pub invoice_number: Option<String>,
    /// Payment date (`YYYY-MM-DD`).
    pub payment_date: Option<String>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Amount received.
    pub amount_paid: Option<RawAmount>,
}

/// A validated receipt request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptRequest {
    /// Number of the invoice being paid.
    pub invoice_number: String,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Payment method.
    pub payment_method: String,
    /// Amount received.
    pub amount_paid: Decimal,
}
