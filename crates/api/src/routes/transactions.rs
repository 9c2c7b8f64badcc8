//! Generic ledger transaction routes.
//!
//! Transactions belong to the actor that recorded them; other actors see
//! neither the rows nor any sign that they exist.

use axum::{
    Router,
    extract::State,
    routing::{delete, get},
};
use serde_json::{Value, json};
use uuid::Uuid;

use haulbook_core::access::Capability;
use haulbook_core::ledger::TransactionInput;
use haulbook_db::TransactionRepository;
use haulbook_db::entities::ledger_transactions;
use haulbook_shared::types::{PageRequest, PageResponse};

use super::page_of;
use crate::error::{ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentActor;
use crate::{AppState, alerts};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/{transaction_id}", delete(delete_transaction))
}

/// POST `/transactions` - Record a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<TransactionInput>,
) -> Created<ledger_transactions::Model> {
    state.require(&actor, Capability::CreateTransaction)?;
    let model = TransactionRepository::new((*state.db).clone())
        .create(actor.id(), &input)
        .await?;
    alerts::after_mutation(&state);
    Ok(created(model))
}

/// GET `/transactions` - The caller's transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<PageResponse<ledger_transactions::Model>> {
    let (rows, total) = TransactionRepository::new((*state.db).clone())
        .list(actor.id(), &page)
        .await?;
    Ok(ok(page_of(rows, &page, total)))
}

/// DELETE `/transactions/{transaction_id}` - Delete one of the caller's transactions.
async fn delete_transaction(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(transaction_id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    TransactionRepository::new((*state.db).clone())
        .delete(actor.id(), transaction_id)
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(json!({ "id": transaction_id, "deleted": true })))
}
