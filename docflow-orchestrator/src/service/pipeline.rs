//! Pipeline Service
//!
//! Business logic for pipeline management.

use docflow_core::domain::pipeline::Pipeline;
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, UpdatePipeline};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{RecordStore, StoreError};

const MAX_NAME_LEN: usize = 255;

/// Service error type
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => PipelineError::Conflict(msg),
            other => PipelineError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Create a new pipeline
pub async fn create_pipeline(store: &dyn RecordStore, req: CreatePipeline) -> Result<Pipeline> {
    validate_name(&req.name)?;

    let pipeline = store.create_pipeline(req).await?;

    tracing::info!("Pipeline created: {} ({})", pipeline.name, pipeline.id);

    Ok(pipeline)
}

/// Get a pipeline by ID
pub async fn get_pipeline(store: &dyn RecordStore, id: Uuid) -> Result<Pipeline> {
    store
        .get_pipeline(id)
        .await?
        .ok_or(PipelineError::NotFound(id))
}

/// List pipelines, newest first
pub async fn list_pipelines(
    store: &dyn RecordStore,
    filter: &PipelineFilter,
) -> Result<Vec<Pipeline>> {
    Ok(store.list_pipelines(filter).await?)
}

/// Apply a partial update to a pipeline
pub async fn update_pipeline(
    store: &dyn RecordStore,
    id: Uuid,
    req: UpdatePipeline,
) -> Result<Pipeline> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }

    let pipeline = store
        .update_pipeline(id, req)
        .await?
        .ok_or(PipelineError::NotFound(id))?;

    tracing::info!("Pipeline updated: {} ({})", pipeline.name, pipeline.id);

    Ok(pipeline)
}

/// Delete a pipeline and its runs
pub async fn delete_pipeline(store: &dyn RecordStore, id: Uuid) -> Result<()> {
    if !store.delete_pipeline(id).await? {
        return Err(PipelineError::NotFound(id));
    }

    tracing::info!("Pipeline deleted: {}", id);

    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PipelineError::ValidationError(
            "Pipeline name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(PipelineError::ValidationError(format!(
            "Pipeline name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }

    Ok(())
}
