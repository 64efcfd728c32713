//! Validation Ruleset API Handlers

use axum::{Json, extract::State, http::StatusCode};
use docflow_core::domain::validation::ValidationRuleSet;
use docflow_core::dto::ruleset::CreateRuleSet;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::ruleset_service;

/// POST /rulesets
/// Register a validation ruleset
pub async fn create_ruleset(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleSet>,
) -> ApiResult<(StatusCode, Json<ValidationRuleSet>)> {
    tracing::info!("Creating ruleset: {}", req.name);

    let ruleset = ruleset_service::create_ruleset(state.store.as_ref(), req).await?;

    Ok((StatusCode::CREATED, Json(ruleset)))
}

/// GET /rulesets
/// List all rulesets
pub async fn list_rulesets(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ValidationRuleSet>>> {
    tracing::debug!("Listing rulesets");

    let rulesets = ruleset_service::list_rulesets(state.store.as_ref()).await?;

    Ok(Json(rulesets))
}
