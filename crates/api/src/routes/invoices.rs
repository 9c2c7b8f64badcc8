//! Invoice and receipt routes.
//!
//! Invoices are scoped to the actor that issued them. Receipts are applied by
//! invoice number within that scope.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use haulbook_core::access::Capability;
use haulbook_core::ledger::{InvoiceInput, ReceiptInput};
use haulbook_db::InvoiceRepository;
use haulbook_db::entities::{invoices, receipts};

use crate::error::{ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath};
use crate::middleware::CurrentActor;
use crate::{AppState, alerts};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/receipts", get(list_receipts))
        .route("/receipts", post(apply_receipt))
}

/// A stored receipt and the invoice it settled.
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    /// The new receipt.
    pub receipt: receipts::Model,
    /// The invoice after the receipt.
    pub invoice: invoices::Model,
}

/// POST `/invoices`
async fn create_invoice(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<InvoiceInput>,
) -> Created<invoices::Model> {
    state.require(&actor, Capability::ManageInvoices)?;
    let invoice = InvoiceRepository::new((*state.db).clone())
        .create(actor.id(), &input)
        .await?;
    alerts::after_mutation(&state);
    Ok(created(invoice))
}

/// GET `/invoices/{invoice_id}`
async fn get_invoice(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> ApiResult<invoices::Model> {
    let invoice = InvoiceRepository::new((*state.db).clone())
        .get(actor.id(), invoice_id)
        .await?;
    Ok(ok(invoice))
}

/// GET `/invoices/{invoice_id}/receipts` - Receipts in the order applied.
async fn list_receipts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> ApiResult<Vec<receipts::Model>> {
    let rows = InvoiceRepository::new((*state.db).clone())
        .receipts(actor.id(), invoice_id)
        .await?;
    Ok(ok(rows))
}

/// POST `/receipts` - Apply a payment to one of the caller's invoices.
async fn apply_receipt(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<ReceiptInput>,
) -> Created<ReceiptResponse> {
    state.require(&actor, Capability::ManageInvoices)?;
    let applied = InvoiceRepository::new((*state.db).clone())
        .with_overpayment(state.config.ledger.overpayment)
        .apply_receipt(actor.id(), &input)
        .await?;
    alerts::after_mutation(&state);
    Ok(created(ReceiptResponse {
        receipt: applied.receipt,
        invoice: applied.invoice,
    }))
}
