//! Run API Handlers
//!
//! HTTP endpoints for triggering and inspecting pipeline runs.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use docflow_core::domain::run::PipelineRun;
use docflow_core::domain::staging::StagedData;
use docflow_core::dto::run::{CreateRun, RunFilter};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /pipelines/{id}/run
/// Execute a pipeline and return the finished run
pub async fn trigger_run(
    State(state): State<AppState>,
    Path(pipeline_id): Path<Uuid>,
    Json(req): Json<CreateRun>,
) -> ApiResult<(StatusCode, Json<PipelineRun>)> {
    tracing::info!("Triggering run for pipeline: {}", pipeline_id);

    let run = state.runs.trigger(pipeline_id, req).await?;

    Ok((StatusCode::CREATED, Json(run)))
}

/// GET /runs
/// List runs, newest first
pub async fn list_runs(
    State(state): State<AppState>,
    Query(filter): Query<RunFilter>,
) -> ApiResult<Json<Vec<PipelineRun>>> {
    tracing::debug!("Listing runs: {:?}", filter);

    let runs = state.runs.list_runs(&filter).await?;

    Ok(Json(runs))
}

/// GET /runs/{id}
/// Get run by ID
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PipelineRun>> {
    tracing::debug!("Getting run: {}", id);

    let run = state.runs.get_run(id).await?;

    Ok(Json(run))
}

/// GET /runs/{id}/staged
/// List the artifacts staged by a run
pub async fn list_staged(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StagedData>>> {
    tracing::debug!("Listing staged data for run: {}", id);

    let staged = state.runs.list_staged(id).await?;

    Ok(Json(staged))
}
