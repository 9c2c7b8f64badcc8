//! Float settings and petty cash category routes.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use haulbook_core::access::Capability;
use haulbook_core::petty_cash::{FloatSettings, SettingsInput};
use haulbook_db::entities::petty_cash_categories;
use haulbook_db::repositories::float_settings::to_settings;
use haulbook_db::{CategoryRepository, FloatSettingsRepository};

use crate::AppState;
use crate::error::{ApiResult, Created, created, ok};
use crate::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::CurrentActor;

/// Creates the settings and category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/petty-cash/settings", get(current_settings).post(activate_settings))
        .route("/petty-cash/settings/history", get(settings_history))
        .route("/petty-cash/categories", get(list_categories).post(create_category))
        .route(
            "/petty-cash/categories/{category_id}/deactivate",
            post(deactivate_category),
        )
}

/// Query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    /// Include deactivated categories.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name, unique.
    pub name: String,
}

/// GET `/petty-cash/settings` - The version governing now.
async fn current_settings(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
) -> ApiResult<FloatSettings> {
    let settings = FloatSettingsRepository::new((*state.db).clone())
        .current(Utc::now())
        .await?;
    Ok(ok(settings))
}

/// POST `/petty-cash/settings` - Append the next settings version.
async fn activate_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(input): ApiJson<SettingsInput>,
) -> Created<FloatSettings> {
    state.require(&actor, Capability::ManageSettings)?;
    let model = FloatSettingsRepository::new((*state.db).clone())
        .activate(
            actor.id(),
            &input,
            state.config.petty_cash.threshold_order,
            Utc::now(),
        )
        .await?;
    Ok(created(to_settings(&model)))
}

/// GET `/petty-cash/settings/history` - Every version, newest first.
async fn settings_history(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
) -> ApiResult<Vec<FloatSettings>> {
    let versions = FloatSettingsRepository::new((*state.db).clone())
        .history()
        .await?;
    Ok(ok(versions))
}

/// GET `/petty-cash/categories`
async fn list_categories(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    ApiQuery(query): ApiQuery<ListCategoriesQuery>,
) -> ApiResult<Vec<petty_cash_categories::Model>> {
    let categories = CategoryRepository::new((*state.db).clone())
        .list(query.include_inactive)
        .await?;
    Ok(ok(categories))
}

/// POST `/petty-cash/categories`
async fn create_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Created<petty_cash_categories::Model> {
    state.require(&actor, Capability::ManageSettings)?;
    let category = CategoryRepository::new((*state.db).clone())
        .create(actor.id(), &body.name, Utc::now())
        .await?;
    Ok(created(category))
}

/// POST `/petty-cash/categories/{category_id}/deactivate`
async fn deactivate_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ApiPath(category_id): ApiPath<Uuid>,
) -> ApiResult<petty_cash_categories::Model> {
    state.require(&actor, Capability::ManageSettings)?;
    let category = CategoryRepository::new((*state.db).clone())
        .deactivate(actor.id(), category_id, Utc::now())
        .await?;
    Ok(ok(category))
}
