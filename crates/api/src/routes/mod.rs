//! API route definitions.

use axum::Router;
use haulbook_shared::types::{PageRequest, PageResponse, clamp_limit};

use crate::AppState;

pub mod alerts;
pub mod clients;
pub mod health;
pub mod invoices;
pub mod notifications;
pub mod petty_cash;
pub mod settings;
pub mod transactions;

/// Creates the API router with all routes.
///
/// Every route except `/health` resolves the caller through
/// [`crate::middleware::CurrentActor`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transactions::routes())
        .merge(clients::routes())
        .merge(invoices::routes())
        .merge(petty_cash::routes())
        .merge(settings::routes())
        .merge(notifications::routes())
        .merge(alerts::routes())
}

/// Wraps one page of rows with its metadata.
pub(crate) fn page_of<T>(rows: Vec<T>, page: &PageRequest, total: u64) -> PageResponse<T> {
    PageResponse::new(rows, page.page.max(1), clamp_limit(Some(page.per_page)), total)
}
