//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod document;
pub mod error;
pub mod health;
pub mod pipeline;
pub mod ruleset;
pub mod run;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::RunService;
use crate::store::RecordStore;

pub use health::ServiceStatus;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub runs: Arc<RunService>,
    pub services: ServiceStatus,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pipeline endpoints
        .route(
            "/pipelines",
            post(pipeline::create_pipeline).get(pipeline::list_pipelines),
        )
        .route(
            "/pipelines/{id}",
            get(pipeline::get_pipeline)
                .put(pipeline::update_pipeline)
                .delete(pipeline::delete_pipeline),
        )
        .route("/pipelines/{id}/run", post(run::trigger_run))
        // Run endpoints
        .route("/runs", get(run::list_runs))
        .route("/runs/{id}", get(run::get_run))
        .route("/runs/{id}/staged", get(run::list_staged))
        // Document endpoints
        .route("/documents", post(document::register_document))
        .route("/documents/{id}", get(document::get_document))
        // Ruleset endpoints
        .route(
            "/rulesets",
            post(ruleset::create_ruleset).get(ruleset::list_rulesets),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
