//! Postgres-backed record store
//!
//! Thin adapter from [`RecordStore`] onto the repository modules.

use async_trait::async_trait;
use docflow_core::domain::document::{Document, IngestedChunk};
use docflow_core::domain::pipeline::Pipeline;
use docflow_core::domain::run::{PipelineRun, RunStatus, RunSummary};
use docflow_core::domain::staging::StagedData;
use docflow_core::domain::validation::ValidationRuleSet;
use docflow_core::dto::document::CreateDocument;
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, UpdatePipeline};
use docflow_core::dto::ruleset::CreateRuleSet;
use docflow_core::dto::run::RunFilter;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewStagedData, RecordStore, StoreError, StoreResult};
use crate::repository::{
    document_repository, pipeline_repository, ruleset_repository, run_repository,
    staging_repository,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explains why a guarded lifecycle update touched no row
    async fn transition_error(&self, id: Uuid, to: RunStatus) -> StoreError {
        match run_repository::find_by_id(&self.pool, id).await {
            Ok(Some(run)) => StoreError::InvalidTransition {
                id,
                from: run.status,
                to,
            },
            Ok(None) => StoreError::not_found("run", id),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
        Ok(pipeline_repository::create(&self.pool, req).await?)
    }

    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(pipeline_repository::find_by_id(&self.pool, id).await?)
    }

    async fn list_pipelines(&self, filter: &PipelineFilter) -> StoreResult<Vec<Pipeline>> {
        Ok(pipeline_repository::list(&self.pool, filter).await?)
    }

    async fn update_pipeline(
        &self,
        id: Uuid,
        req: UpdatePipeline,
    ) -> StoreResult<Option<Pipeline>> {
        let Some(mut pipeline) = pipeline_repository::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        req.apply_to(&mut pipeline);
        pipeline.updated_at = chrono::Utc::now();

        if !pipeline_repository::save(&self.pool, &pipeline).await? {
            return Ok(None);
        }
        Ok(Some(pipeline))
    }

    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
        Ok(pipeline_repository::delete(&self.pool, id).await?)
    }

    async fn create_run(
        &self,
        pipeline_id: Uuid,
        input_ref: Option<String>,
    ) -> StoreResult<PipelineRun> {
        Ok(run_repository::create(&self.pool, pipeline_id, input_ref).await?)
    }

    async fn get_run(&self, id: Uuid) -> StoreResult<Option<PipelineRun>> {
        Ok(run_repository::find_by_id(&self.pool, id).await?)
    }

    async fn list_runs(&self, filter: &RunFilter) -> StoreResult<Vec<PipelineRun>> {
        Ok(run_repository::list(&self.pool, filter).await?)
    }

    async fn mark_run_running(&self, id: Uuid) -> StoreResult<PipelineRun> {
        match run_repository::update_status_to_running(&self.pool, id).await? {
            Some(run) => Ok(run),
            None => Err(self.transition_error(id, RunStatus::Running).await),
        }
    }

    async fn mark_run_succeeded(&self, id: Uuid, summary: &RunSummary) -> StoreResult<PipelineRun> {
        match run_repository::update_status_to_succeeded(&self.pool, id, summary).await? {
            Some(run) => Ok(run),
            None => Err(self.transition_error(id, RunStatus::Succeeded).await),
        }
    }

    async fn mark_run_failed(&self, id: Uuid, error_message: &str) -> StoreResult<PipelineRun> {
        match run_repository::update_status_to_failed(&self.pool, id, error_message).await? {
            Some(run) => Ok(run),
            None => Err(self.transition_error(id, RunStatus::Failed).await),
        }
    }

    async fn create_document(
        &self,
        req: CreateDocument,
        pipeline_run_id: Option<Uuid>,
    ) -> StoreResult<Document> {
        Ok(document_repository::create(&self.pool, req, pipeline_run_id).await?)
    }

    async fn get_document(&self, id: Uuid) -> StoreResult<Option<Document>> {
        Ok(document_repository::find_by_id(&self.pool, id).await?)
    }

    async fn append_chunk(
        &self,
        document_id: Uuid,
        content: &str,
        metadata: Option<Value>,
    ) -> StoreResult<IngestedChunk> {
        Ok(
            document_repository::append_chunk(&self.pool, document_id, content, metadata.as_ref())
                .await?,
        )
    }

    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<IngestedChunk>> {
        Ok(document_repository::list_chunks(&self.pool, document_id).await?)
    }

    async fn create_staged(&self, new: NewStagedData) -> StoreResult<StagedData> {
        Ok(staging_repository::create(&self.pool, new).await?)
    }

    async fn list_staged_for_run(&self, run_id: Uuid) -> StoreResult<Vec<StagedData>> {
        Ok(staging_repository::find_by_run(&self.pool, run_id).await?)
    }

    async fn create_ruleset(&self, req: CreateRuleSet) -> StoreResult<ValidationRuleSet> {
        Ok(ruleset_repository::create(&self.pool, req).await?)
    }

    async fn find_ruleset(&self, name: &str) -> StoreResult<Option<ValidationRuleSet>> {
        Ok(ruleset_repository::find_by_name(&self.pool, name).await?)
    }

    async fn list_rulesets(&self) -> StoreResult<Vec<ValidationRuleSet>> {
        Ok(ruleset_repository::list_all(&self.pool).await?)
    }
}
