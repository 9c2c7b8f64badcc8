//! Client account routes.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use uuid::Uuid;

use haulbook_core::access::Capability;
use haulbook_core::ledger::{ClientInput, ClientPatch};
use haulbook_db::entities::{audit_records, clients};
use haulbook_db::{ClientRepository, ImportSummary};
use haulbook_shared::types::{PageRequest, PageResponse};

use super::page_of;
use crate::error::{ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentActor;
use crate::{AppState, alerts};

/// Creates the client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/import", post(import_clients))
        .route("/clients/{client_id}", get(get_client).patch(update_client))
        .route("/clients/{client_id}/history", get(client_history))
}

/// An amended account and the history summary written for it.
#[derive(Debug, Serialize)]
pub struct ClientUpdateResponse {
    /// Account after the update.
    pub client: clients::Model,
    /// Recorded change summary.
    pub summary: String,
}

/// POST `/clients` - Open a client account.
async fn create_client(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<ClientInput>,
) -> Created<clients::Model> {
    state.require(&actor, Capability::EditClient)?;
    let client = ClientRepository::new((*state.db).clone())
        .create(actor.id(), &input)
        .await?;
    alerts::after_mutation(&state);
    Ok(created(client))
}

/// GET `/clients` - Accounts ordered by name.
async fn list_clients(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> ApiResult<PageResponse<clients::Model>> {
    let (rows, total) = ClientRepository::new((*state.db).clone()).list(&page).await?;
    Ok(ok(page_of(rows, &page, total)))
}

/// GET `/clients/{client_id}`
async fn get_client(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    ApiPath(client_id): ApiPath<Uuid>,
) -> ApiResult<clients::Model> {
    let client = ClientRepository::new((*state.db).clone()).get(client_id).await?;
    Ok(ok(client))
}

/// PATCH `/clients/{client_id}` - Amend an account, recording the diff.
async fn update_client(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ClientPatch>,
) -> ApiResult<ClientUpdateResponse> {
    state.require(&actor, Capability::EditClient)?;
    let update = ClientRepository::new((*state.db).clone())
        .update(actor.id(), client_id, &patch)
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(ClientUpdateResponse {
        client: update.client,
        summary: update.summary,
    }))
}

/// POST `/clients/import` - Upsert a batch of accounts by registration number.
///
/// The batch is all-or-nothing; the first bad row aborts it and is named in
/// the error.
async fn import_clients(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(rows): ApiJson<Vec<ClientInput>>,
) -> ApiResult<ImportSummary> {
    state.require(&actor, Capability::EditClient)?;
    let summary = ClientRepository::new((*state.db).clone())
        .import(actor.id(), &rows)
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(summary))
}

/// GET `/clients/{client_id}/history` - Audit records, oldest first.
async fn client_history(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    ApiPath(client_id): ApiPath<Uuid>,
) -> ApiResult<Vec<audit_records::Model>> {
    let history = ClientRepository::new((*state.db).clone())
        .history(client_id)
        .await?;
    Ok(ok(history))
}
