//! Alert evaluation routes.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;

use haulbook_core::access::Capability;
use haulbook_db::entities::alert_states;
use haulbook_db::{AlertRepository, EvaluationReport};

use crate::AppState;
use crate::error::{ApiResult, ok};
use crate::middleware::CurrentActor;

/// Creates the alert routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts/evaluate", post(evaluate_alerts))
        .route("/alerts/states", get(alert_states))
}

/// POST `/alerts/evaluate` - Run the configured rules now.
async fn evaluate_alerts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<EvaluationReport> {
    state.require(&actor, Capability::RunAlerts)?;
    let report = crate::alerts::evaluate(&state, Utc::now()).await?;
    Ok(ok(report))
}

/// GET `/alerts/states` - Edge-detector memory, active pairs first.
async fn alert_states(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Vec<alert_states::Model>> {
    state.require(&actor, Capability::RunAlerts)?;
    let states = AlertRepository::new((*state.db).clone()).states().await?;
    Ok(ok(states))
}
