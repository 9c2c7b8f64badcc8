//! Petty cash entry routes.
//!
//! Recording and editing belong to the entry's creator. Approvers see every
//! entry; everyone else sees only their own.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use haulbook_core::access::{Actor, Capability};
use haulbook_core::petty_cash::{ApprovalStatus, EntryInput, EntryPatch, FloatSummary};
use haulbook_db::entities::petty_cash_entries;
use haulbook_db::{EntryFilter, PettyCashRepository};
use haulbook_shared::AppError;
use haulbook_shared::types::{PageRequest, PageResponse};

use super::page_of;
use crate::error::{ApiError, ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentActor;
use crate::{AppState, alerts};

/// Creates the petty cash entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/petty-cash/entries", get(list_entries).post(create_entry))
        .route(
            "/petty-cash/entries/{entry_id}",
            get(get_entry).patch(update_entry).delete(delete_entry),
        )
        .route("/petty-cash/entries/{entry_id}/approve", post(approve_entry))
        .route("/petty-cash/entries/{entry_id}/reject", post(reject_entry))
        .route("/petty-cash/entries/{entry_id}/lock", post(lock_entry))
        .route("/petty-cash/summary", get(float_summary))
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// `pending`, `approved`, or `rejected`.
    pub status: Option<String>,
    /// Earliest transaction date (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Latest transaction date (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for rejecting an entry.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    /// Why the entry was refused.
    pub reason: Option<String>,
}

fn sees_all_entries(state: &AppState, actor: &Actor) -> bool {
    state
        .checker
        .has_capability(actor, Capability::ApprovePettyCash)
}

/// POST `/petty-cash/entries` - Record a movement.
async fn create_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<EntryInput>,
) -> Created<petty_cash_entries::Model> {
    state.require(&actor, Capability::RecordPettyCash)?;
    let entry = PettyCashRepository::new((*state.db).clone())
        .create(actor.id(), &input, Utc::now())
        .await?;
    alerts::after_mutation(&state);
    Ok(created(entry))
}

/// GET `/petty-cash/entries` - Entries newest first, filtered.
async fn list_entries(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<ListEntriesQuery>,
) -> ApiResult<PageResponse<petty_cash_entries::Model>> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            ApprovalStatus::parse(raw)
                .ok_or_else(|| ApiError(AppError::Validation(format!("Unknown status '{raw}'"))))
        })
        .transpose()?;
    let filter = EntryFilter {
        owner: (!sees_all_entries(&state, &actor)).then(|| actor.id()),
        status,
        from: query.from,
        to: query.to,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let (rows, total) = PettyCashRepository::new((*state.db).clone())
        .list(&filter, &page)
        .await?;
    Ok(ok(page_of(rows, &page, total)))
}

/// GET `/petty-cash/entries/{entry_id}`
async fn get_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> ApiResult<petty_cash_entries::Model> {
    let repo = PettyCashRepository::new((*state.db).clone());
    let entry = if sees_all_entries(&state, &actor) {
        repo.get(entry_id).await?
    } else {
        repo.get_owned(actor.id(), entry_id).await?
    };
    Ok(ok(entry))
}

/// PATCH `/petty-cash/entries/{entry_id}` - Edit one of the caller's entries.
async fn update_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<EntryPatch>,
) -> ApiResult<petty_cash_entries::Model> {
    state.require(&actor, Capability::RecordPettyCash)?;
    let entry = PettyCashRepository::new((*state.db).clone())
        .update(actor.id(), entry_id, &patch, Utc::now())
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(entry))
}

/// DELETE `/petty-cash/entries/{entry_id}`
async fn delete_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.require(&actor, Capability::RecordPettyCash)?;
    PettyCashRepository::new((*state.db).clone())
        .delete(actor.id(), entry_id, Utc::now())
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(json!({ "id": entry_id, "deleted": true })))
}

/// POST `/petty-cash/entries/{entry_id}/approve`
async fn approve_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> ApiResult<petty_cash_entries::Model> {
    state.require(&actor, Capability::ApprovePettyCash)?;
    let entry = PettyCashRepository::new((*state.db).clone())
        .approve(actor.id(), entry_id, Utc::now())
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(entry))
}

/// POST `/petty-cash/entries/{entry_id}/reject`
async fn reject_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RejectRequest>,
) -> ApiResult<petty_cash_entries::Model> {
    state.require(&actor, Capability::ApprovePettyCash)?;
    let entry = PettyCashRepository::new((*state.db).clone())
        .reject(
            actor.id(),
            entry_id,
            body.reason.as_deref().unwrap_or_default(),
            Utc::now(),
        )
        .await?;
    alerts::after_mutation(&state);
    Ok(ok(entry))
}

/// POST `/petty-cash/entries/{entry_id}/lock`
async fn lock_entry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> ApiResult<petty_cash_entries::Model> {
    state.require(&actor, Capability::LockPettyCash)?;
    let entry = PettyCashRepository::new((*state.db).clone())
        .lock(actor.id(), entry_id, Utc::now())
        .await?;
    Ok(ok(entry))
}

/// GET `/petty-cash/summary` - Float position under the governing settings.
async fn float_summary(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
) -> ApiResult<FloatSummary> {
    let summary = PettyCashRepository::new((*state.db).clone())
        .summary(Utc::now())
        .await?;
    Ok(ok(summary))
}
