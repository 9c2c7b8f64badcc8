//! Notification routes.
//!
//! Each caller sees notifications addressed to them plus broadcasts, with
//! read state tracked per caller.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use haulbook_core::access::Capability;
use haulbook_core::notification::NotificationInput;
use haulbook_db::entities::notifications;
use haulbook_db::{NotificationRepository, NotificationView};

use crate::AppState;
use crate::error::{ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentActor;

/// Creates the notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications).post(create_notification))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{notification_id}/read", post(mark_read))
}

/// Query parameters for listing notifications.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Maximum rows (default: 20, clamped to 1..=100).
    pub limit: Option<u32>,
}

/// Count of notifications.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// How many.
    pub count: u64,
}

/// GET `/notifications` - Newest first.
async fn list_notifications(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<ListNotificationsQuery>,
) -> ApiResult<Vec<NotificationView>> {
    let rows = NotificationRepository::new((*state.db).clone())
        .list(actor.id(), query.unread_only, query.limit)
        .await?;
    Ok(ok(rows))
}

/// POST `/notifications` - Send a notification by hand.
async fn create_notification(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<NotificationInput>,
) -> Created<notifications::Model> {
    state.require(&actor, Capability::ManageNotifications)?;
    let notification = NotificationRepository::new((*state.db).clone())
        .create(&input, Utc::now())
        .await?;
    Ok(created(notification))
}

/// GET `/notifications/unread-count`
async fn unread_count(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<CountResponse> {
    let count = NotificationRepository::new((*state.db).clone())
        .unread_count(actor.id())
        .await?;
    Ok(ok(CountResponse { count }))
}

/// POST `/notifications/{notification_id}/read`
async fn mark_read(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(notification_id): ApiPath<i64>,
) -> ApiResult<Value> {
    NotificationRepository::new((*state.db).clone())
        .mark_read(actor.id(), notification_id, Utc::now())
        .await?;
    Ok(ok(json!({ "id": notification_id, "read": true })))
}

/// POST `/notifications/read-all`
async fn mark_all_read(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<CountResponse> {
    let count = NotificationRepository::new((*state.db).clone())
        .mark_all_read(actor.id(), Utc::now())
        .await?;
    Ok(ok(CountResponse { count }))
}
