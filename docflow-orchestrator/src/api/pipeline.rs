//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use docflow_core::domain::pipeline::Pipeline;
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, PipelineSummary, UpdatePipeline};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::pipeline_service;

/// POST /pipelines
/// Register a new pipeline
pub async fn create_pipeline(
    State(state): State<AppState>,
    Json(req): Json<CreatePipeline>,
) -> ApiResult<(StatusCode, Json<Pipeline>)> {
    tracing::info!("Creating pipeline: {}", req.name);

    let pipeline = pipeline_service::create_pipeline(state.store.as_ref(), req).await?;

    Ok((StatusCode::CREATED, Json(pipeline)))
}

/// GET /pipelines
/// List pipelines, optionally filtered by use case
pub async fn list_pipelines(
    State(state): State<AppState>,
    Query(filter): Query<PipelineFilter>,
) -> ApiResult<Json<Vec<PipelineSummary>>> {
    tracing::debug!("Listing pipelines: {:?}", filter);

    let pipelines = pipeline_service::list_pipelines(state.store.as_ref(), &filter).await?;

    Ok(Json(pipelines.into_iter().map(PipelineSummary::from).collect()))
}

/// GET /pipelines/{id}
/// Get pipeline by ID
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Pipeline>> {
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = pipeline_service::get_pipeline(state.store.as_ref(), id).await?;

    Ok(Json(pipeline))
}

/// PUT /pipelines/{id}
/// Replace the given fields of a pipeline
pub async fn update_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePipeline>,
) -> ApiResult<Json<Pipeline>> {
    tracing::info!("Updating pipeline: {}", id);

    let pipeline = pipeline_service::update_pipeline(state.store.as_ref(), id, req).await?;

    Ok(Json(pipeline))
}

/// DELETE /pipelines/{id}
/// Delete a pipeline and its runs
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting pipeline: {}", id);

    pipeline_service::delete_pipeline(state.store.as_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}
