//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the ledger, petty cash, notifications, and alerts
//! - The actor extractor fed by gateway headers
//! - The `{success, data | error}` response envelope
//! - Scheduled and mutation-triggered alert evaluation

pub mod alerts;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use haulbook_core::access::{Actor, Capability, GrantedCapabilities, PermissionChecker, require};
use haulbook_shared::AppConfig;

use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Capability checks for every mutating operation.
    pub checker: Arc<dyn PermissionChecker>,
}

impl AppState {
    /// Creates state with the default capability checker.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            checker: Arc::new(GrantedCapabilities),
        }
    }

    /// Replaces the capability checker.
    #[must_use]
    pub fn with_checker(mut self, checker: Arc<dyn PermissionChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Fails with 403 unless `actor` holds `capability`.
    pub fn require(&self, actor: &Actor, capability: Capability) -> Result<(), ApiError> {
        require(self.checker.as_ref(), actor, capability).map_err(ApiError::from)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
