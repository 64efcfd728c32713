//! Record store
//!
//! The persistence capability consumed by the execution engine and services.
//! Every call is an independent, immediately committed unit of work and reads
//! observe prior writes.
//!
//! All access goes through the [`RecordStore`] trait so the engine can run
//! against Postgres in production and an in-memory store in tests.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use docflow_core::domain::document::{Document, IngestedChunk};
use docflow_core::domain::pipeline::{Pipeline, UseCase};
use docflow_core::domain::run::{PipelineRun, RunStatus, RunSummary};
use docflow_core::domain::staging::StagedData;
use docflow_core::domain::validation::{ValidationRuleSet, ValidationStatus};
use docflow_core::dto::document::CreateDocument;
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, UpdatePipeline};
use docflow_core::dto::ruleset::CreateRuleSet;
use docflow_core::dto::run::RunFilter;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given identifier
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A unique constraint was violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a record that does not exist
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A run lifecycle update was attempted from the wrong state
    #[error("run {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: RunStatus,
        to: RunStatus,
    },

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingReference(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Staged artifact about to be written
#[derive(Debug, Clone)]
pub struct NewStagedData {
    pub pipeline_run_id: Uuid,
    pub document_id: Option<Uuid>,
    pub use_case: UseCase,
    pub payload_type: String,
    pub payload: Value,
    pub validation_status: ValidationStatus,
    pub issues: Vec<String>,
}

/// Persistence capability for pipelines, runs, documents, staged data and rulesets
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Pipelines
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline>;
    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>>;
    async fn list_pipelines(&self, filter: &PipelineFilter) -> StoreResult<Vec<Pipeline>>;
    /// Applies a partial update; `None` when the pipeline does not exist
    async fn update_pipeline(&self, id: Uuid, req: UpdatePipeline)
    -> StoreResult<Option<Pipeline>>;
    /// Deletes a pipeline together with its runs
    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool>;

    // Runs
    async fn create_run(&self, pipeline_id: Uuid, input_ref: Option<String>)
    -> StoreResult<PipelineRun>;
    async fn get_run(&self, id: Uuid) -> StoreResult<Option<PipelineRun>>;
    async fn list_runs(&self, filter: &RunFilter) -> StoreResult<Vec<PipelineRun>>;
    async fn mark_run_running(&self, id: Uuid) -> StoreResult<PipelineRun>;
    async fn mark_run_succeeded(&self, id: Uuid, summary: &RunSummary) -> StoreResult<PipelineRun>;
    async fn mark_run_failed(&self, id: Uuid, error_message: &str) -> StoreResult<PipelineRun>;

    // Documents
    async fn create_document(
        &self,
        req: CreateDocument,
        pipeline_run_id: Option<Uuid>,
    ) -> StoreResult<Document>;
    async fn get_document(&self, id: Uuid) -> StoreResult<Option<Document>>;
    /// Appends a chunk at the next free index of the document
    async fn append_chunk(
        &self,
        document_id: Uuid,
        content: &str,
        metadata: Option<Value>,
    ) -> StoreResult<IngestedChunk>;
    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<IngestedChunk>>;

    // Staged data
    async fn create_staged(&self, new: NewStagedData) -> StoreResult<StagedData>;
    async fn list_staged_for_run(&self, run_id: Uuid) -> StoreResult<Vec<StagedData>>;

    // Validation rulesets
    async fn create_ruleset(&self, req: CreateRuleSet) -> StoreResult<ValidationRuleSet>;
    async fn find_ruleset(&self, name: &str) -> StoreResult<Option<ValidationRuleSet>>;
    async fn list_rulesets(&self) -> StoreResult<Vec<ValidationRuleSet>>;
}
