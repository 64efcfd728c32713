//! Health Check API Handler
//!
//! Reports which backing services the orchestrator was started with.

use axum::{Json, extract::State};
use serde::Serialize;

use super::AppState;
use crate::config::Config;

/// Backing services as configured at start-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceStatus {
    /// `postgres` or `memory`
    pub database: &'static str,
    /// `ok` when an index endpoint is configured, `down` otherwise
    pub vector_index: &'static str,
}

impl ServiceStatus {
    pub fn from_config(config: &Config) -> Self {
        Self {
            database: if config.database_url.is_some() {
                "postgres"
            } else {
                "memory"
            },
            vector_index: if config.vector_index_url.is_some() {
                "ok"
            } else {
                "down"
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub services: ServiceStatus,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        services: state.services,
    })
}
