//! Haulbook API Server
//!
//! Main entry point for the Haulbook back-office service.

use anyhow::Context;
use tokio::{net::TcpListener, sync::watch};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use haulbook_api::{AppState, alerts, create_router};
use haulbook_db::connect;
use haulbook_db::migration::{Migrator, MigratorTrait};
use haulbook_shared::AppConfig;
use haulbook_shared::config::LoggingConfig;

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal(mut stop: watch::Receiver<bool>) {
    // Either every sender is gone or the flag flipped; both mean stop.
    let _ = stop.wait_for(|stopped| *stopped).await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    info!(
        threshold_order = ?config.petty_cash.threshold_order,
        overpayment = ?config.ledger.overpayment,
        alert_interval_secs = config.alerts.interval_secs,
        evaluate_on_mutation = config.alerts.evaluate_on_mutation,
        "Configuration loaded"
    );

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .context("Failed to apply migrations")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db, config);

    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler = tokio::spawn(alerts::run_scheduler(
        state.clone(),
        shutdown_signal(stop_rx.clone()),
    ));

    let app = create_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
            let _ = stop_tx.send(true);
        })
        .await?;

    scheduler.await.context("Alert scheduler panicked")?;
    info!("Server stopped");
    Ok(())
}
