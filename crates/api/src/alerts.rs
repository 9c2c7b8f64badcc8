//! Alert evaluation triggers: explicit, after mutations, and on a schedule.
//!
//! Rules are re-read from `alerts.rules_file` on every run. Overlapping runs
//! are safe; the alert repository only notifies for writes it wins.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;

use haulbook_core::access::{Actor, Capability, require};
use haulbook_core::alerts::{AlertError, RuleSet};
use haulbook_db::{AlertRepository, EvaluationReport};

use crate::AppState;

/// Loads the configured rules and evaluates them at `now`.
pub async fn evaluate(state: &AppState, now: DateTime<Utc>) -> Result<EvaluationReport, AlertError> {
    let rules = RuleSet::load(&state.config.alerts.rules_file)?;
    AlertRepository::new((*state.db).clone())
        .evaluate(&rules, now)
        .await
}

fn log_outcome(trigger: &'static str, outcome: &Result<EvaluationReport, AlertError>) {
    match outcome {
        Ok(report) => tracing::info!(
            trigger,
            raised = report.raised.len(),
            cleared = report.cleared,
            "Alert evaluation finished"
        ),
        Err(AlertError::Transient(e)) => {
            tracing::warn!(trigger, error = %e, "Alert evaluation hit a transient failure");
        }
        Err(e) => tracing::error!(trigger, error = %e, "Alert evaluation failed"),
    }
}

/// Spawns an evaluation after a committed mutation when
/// `alerts.evaluate_on_mutation` is set.
pub fn after_mutation(state: &AppState) {
    if !state.config.alerts.evaluate_on_mutation {
        return;
    }
    let state = state.clone();
    tokio::spawn(async move {
        let outcome = evaluate(&state, Utc::now()).await;
        log_outcome("mutation", &outcome);
    });
}

/// Evaluates every `alerts.interval_secs` as the system actor until
/// `shutdown` completes. An interval of zero disables the scheduler.
pub async fn run_scheduler(state: AppState, shutdown: impl Future<Output = ()>) {
    let period = state.config.alerts.interval_secs;
    if period == 0 {
        tracing::info!("Alert scheduler disabled");
        return;
    }

    let system = Actor::system();
    if let Err(denied) = require(state.checker.as_ref(), &system, Capability::RunAlerts) {
        tracing::error!(error = %denied, "System actor may not run alerts; scheduler not started");
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(period));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    tracing::info!(interval_secs = period, "Alert scheduler started");

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                let outcome = evaluate(&state, Utc::now()).await;
                log_outcome("schedule", &outcome);
            }
        }
    }
    tracing::info!("Alert scheduler stopped");
}
