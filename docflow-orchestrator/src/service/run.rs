//! Run Service
//!
//! Owns the run lifecycle: `queued -> running -> succeeded | failed`.
//! Input is checked before a run row exists; once a run is `running`, every
//! failure ends up on the run record instead of being returned to the caller.

use docflow_core::domain::run::PipelineRun;
use docflow_core::domain::staging::StagedData;
use docflow_core::dto::run::{CreateRun, RunFilter};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

use crate::engine::{ExecutionContext, Orchestrator, RunInput};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("one of document_id, file_path or text_payload must be provided")]
    InvalidInput,

    #[error("pipeline {0} not found")]
    PipelineNotFound(Uuid),

    #[error("pipeline {0} is inactive")]
    PipelineInactive(Uuid),

    #[error("run {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RunError>;

pub struct RunService {
    store: Arc<dyn RecordStore>,
    orchestrator: Orchestrator,
    /// Run-level deadline; `None` lets runs take as long as they need
    timeout: Option<Duration>,
}

impl RunService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        orchestrator: Orchestrator,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            store,
            orchestrator,
            timeout,
        }
    }

    /// Creates a run of `pipeline_id` and executes it to a terminal state
    ///
    /// Blocks until the run has succeeded or failed and returns the final
    /// run record.
    pub async fn trigger(&self, pipeline_id: Uuid, req: CreateRun) -> Result<PipelineRun> {
        let req = req.normalized();
        if !req.has_input() {
            return Err(RunError::InvalidInput);
        }

        let pipeline = self
            .store
            .get_pipeline(pipeline_id)
            .await?
            .ok_or(RunError::PipelineNotFound(pipeline_id))?;
        if !pipeline.is_active {
            return Err(RunError::PipelineInactive(pipeline_id));
        }

        let run = self
            .store
            .create_run(pipeline.id, req.input_ref.clone())
            .await?;
        tracing::info!("Run created: {} for pipeline: {}", run.id, pipeline.id);

        let run = self.store.mark_run_running(run.id).await?;

        let ctx = ExecutionContext::new(RunInput {
            run_id: run.id,
            pipeline_id: pipeline.id,
            use_case: pipeline.use_case,
            request: req,
        })
        .with_deadline(self.timeout.map(|t| Instant::now() + t));

        let execution = self.orchestrator.execute(&pipeline, ctx);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("run exceeded its deadline of {:?}", limit)),
            },
            None => execution.await.map_err(|e| e.to_string()),
        };

        let run = match outcome {
            Ok(summary) => match self.store.mark_run_succeeded(run.id, &summary).await {
                Ok(run) => {
                    tracing::info!(
                        run_id = %run.id,
                        chunk_count = summary.chunk_count,
                        "Run succeeded"
                    );
                    run
                }
                Err(e @ (StoreError::NotFound { .. } | StoreError::InvalidTransition { .. })) => {
                    return Err(e.into());
                }
                Err(e) => {
                    let message = format!("failed to record run result: {}", e);
                    tracing::error!(run_id = %run.id, error = %message, "Run failed");
                    self.store.mark_run_failed(run.id, &message).await?
                }
            },
            Err(message) => {
                tracing::error!(run_id = %run.id, error = %message, "Run failed");
                self.store.mark_run_failed(run.id, &message).await?
            }
        };

        Ok(run)
    }

    /// Get a run by ID
    pub async fn get_run(&self, id: Uuid) -> Result<PipelineRun> {
        self.store
            .get_run(id)
            .await?
            .ok_or(RunError::NotFound(id))
    }

    /// List runs, newest first
    pub async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<PipelineRun>> {
        Ok(self.store.list_runs(filter).await?)
    }

    /// List the artifacts a run staged
    pub async fn list_staged(&self, run_id: Uuid) -> Result<Vec<StagedData>> {
        let run = self.get_run(run_id).await?;
        Ok(self.store.list_staged_for_run(run.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::vector_index::{
        MemoryVectorIndex, VectorIndex, VectorIndexError, VectorRecord,
    };
    use crate::engine::node::{
        INGESTION_NODE, LLM_PROCESSING_NODE, STAGING_NODE, VALIDATION_NODE,
    };
    use crate::engine::{RulesetRegistry, StagingSink};
    use crate::store::{MemoryStore, NewStagedData, StoreResult};
    use async_trait::async_trait;
    use docflow_core::domain::document::{Document, IngestedChunk};
    use docflow_core::domain::pipeline::{NodeSpec, Pipeline, PipelineDefinition, UseCase};
    use docflow_core::domain::run::{RunStatus, RunSummary};
    use docflow_core::domain::validation::{ValidationRuleSet, ValidationStatus};
    use docflow_core::dto::document::CreateDocument;
    use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, UpdatePipeline};
    use docflow_core::dto::ruleset::CreateRuleSet;
    use serde_json::{Value, json};

    struct StalledIndex;

    #[async_trait]
    impl VectorIndex for StalledIndex {
        async fn insert(&self, _record: VectorRecord) -> std::result::Result<(), VectorIndexError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    /// Delegates to a `MemoryStore`, optionally stalling chunk writes or
    /// rejecting the succeeded transition
    #[derive(Default)]
    struct FaultyStore {
        inner: MemoryStore,
        stall_chunks: bool,
        reject_success: bool,
    }

    #[async_trait]
    impl RecordStore for FaultyStore {
        async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
            self.inner.create_pipeline(req).await
        }
        async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
            self.inner.get_pipeline(id).await
        }
        async fn list_pipelines(&self, filter: &PipelineFilter) -> StoreResult<Vec<Pipeline>> {
            self.inner.list_pipelines(filter).await
        }
        async fn update_pipeline(
            &self,
            id: Uuid,
            req: UpdatePipeline,
        ) -> StoreResult<Option<Pipeline>> {
            self.inner.update_pipeline(id, req).await
        }
        async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
            self.inner.delete_pipeline(id).await
        }
        async fn create_run(
            &self,
            pipeline_id: Uuid,
            input_ref: Option<String>,
        ) -> StoreResult<PipelineRun> {
            self.inner.create_run(pipeline_id, input_ref).await
        }
        async fn get_run(&self, id: Uuid) -> StoreResult<Option<PipelineRun>> {
            self.inner.get_run(id).await
        }
        async fn list_runs(&self, filter: &RunFilter) -> StoreResult<Vec<PipelineRun>> {
            self.inner.list_runs(filter).await
        }
        async fn mark_run_running(&self, id: Uuid) -> StoreResult<PipelineRun> {
            self.inner.mark_run_running(id).await
        }
        async fn mark_run_succeeded(
            &self,
            id: Uuid,
            summary: &RunSummary,
        ) -> StoreResult<PipelineRun> {
            if self.reject_success {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            self.inner.mark_run_succeeded(id, summary).await
        }
        async fn mark_run_failed(&self, id: Uuid, error_message: &str) -> StoreResult<PipelineRun> {
            self.inner.mark_run_failed(id, error_message).await
        }
        async fn create_document(
            &self,
            req: CreateDocument,
            pipeline_run_id: Option<Uuid>,
        ) -> StoreResult<Document> {
            self.inner.create_document(req, pipeline_run_id).await
        }
        async fn get_document(&self, id: Uuid) -> StoreResult<Option<Document>> {
            self.inner.get_document(id).await
        }
        async fn append_chunk(
            &self,
            document_id: Uuid,
            content: &str,
            metadata: Option<Value>,
        ) -> StoreResult<IngestedChunk> {
            if self.stall_chunks {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.append_chunk(document_id, content, metadata).await
        }
        async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<IngestedChunk>> {
            self.inner.list_chunks(document_id).await
        }
        async fn create_staged(&self, new: NewStagedData) -> StoreResult<StagedData> {
            self.inner.create_staged(new).await
        }
        async fn list_staged_for_run(&self, run_id: Uuid) -> StoreResult<Vec<StagedData>> {
            self.inner.list_staged_for_run(run_id).await
        }
        async fn create_ruleset(&self, req: CreateRuleSet) -> StoreResult<ValidationRuleSet> {
            self.inner.create_ruleset(req).await
        }
        async fn find_ruleset(&self, name: &str) -> StoreResult<Option<ValidationRuleSet>> {
            self.inner.find_ruleset(name).await
        }
        async fn list_rulesets(&self) -> StoreResult<Vec<ValidationRuleSet>> {
            self.inner.list_rulesets().await
        }
    }

    fn service_with(
        store: Arc<dyn RecordStore>,
        sink: StagingSink,
        timeout: Option<Duration>,
    ) -> RunService {
        let orchestrator = Orchestrator::new(store.clone(), RulesetRegistry::new(), sink);
        RunService::new(store, orchestrator, timeout)
    }

    fn recording_sink() -> StagingSink {
        StagingSink::new(Arc::new(MemoryVectorIndex::default()), 4)
    }

    fn service(store: Arc<MemoryStore>) -> RunService {
        service_with(store, recording_sink(), None)
    }

    async fn pipeline(store: &MemoryStore, nodes: Vec<NodeSpec>) -> Pipeline {
        store
            .create_pipeline(CreatePipeline {
                name: format!("pipeline-{}", Uuid::new_v4()),
                description: None,
                use_case: UseCase::Generic,
                definition: PipelineDefinition {
                    nodes,
                    ..Default::default()
                },
            })
            .await
            .unwrap()
    }

    fn full_nodes(write_embeddings: bool) -> Vec<NodeSpec> {
        vec![
            NodeSpec::new(INGESTION_NODE, json!({})),
            NodeSpec::new(LLM_PROCESSING_NODE, json!({})),
            NodeSpec::new(VALIDATION_NODE, json!({})),
            NodeSpec::new(STAGING_NODE, json!({"write_embeddings": write_embeddings})),
        ]
    }

    fn text(payload: &str) -> CreateRun {
        CreateRun {
            text_payload: Some(payload.to_string()),
            ..Default::default()
        }
    }

    fn assert_timestamps_match_status(run: &PipelineRun) {
        assert_eq!(run.started_at.is_some(), run.status != RunStatus::Queued);
        assert_eq!(run.completed_at.is_some(), run.status.is_terminal());
    }

    #[tokio::test]
    async fn test_successful_run() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;

        let run = runs
            .trigger(
                p.id,
                CreateRun {
                    input_ref: Some("upload-1".to_string()),
                    text_payload: Some("Invoice #1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Succeeded);
        assert_eq!(run.input_ref.as_deref(), Some("upload-1"));
        assert!(run.error_message.is_none());
        assert_timestamps_match_status(&run);

        let summary = run.result_summary.unwrap();
        assert_eq!(summary.chunk_count, 1);
        assert_eq!(summary.llm_output.unwrap().result, "Invoice #1");
        assert_eq!(
            summary.validation_report.unwrap().status,
            ValidationStatus::Passed
        );

        let staged = runs.list_staged(run.id).await.unwrap();
        assert_eq!(staged.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_creates_no_run() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;

        let blank = CreateRun {
            input_ref: Some("ref".to_string()),
            file_path: Some(String::new()),
            text_payload: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            runs.trigger(p.id, CreateRun::default()).await,
            Err(RunError::InvalidInput)
        ));
        assert!(matches!(
            runs.trigger(p.id, blank).await,
            Err(RunError::InvalidInput)
        ));

        let all = runs.list_runs(&RunFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_pipelines_create_no_run() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;
        store
            .update_pipeline(
                p.id,
                UpdatePipeline {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            runs.trigger(p.id, text("x")).await,
            Err(RunError::PipelineInactive(_))
        ));
        assert!(matches!(
            runs.trigger(Uuid::new_v4(), text("x")).await,
            Err(RunError::PipelineNotFound(_))
        ));
        assert!(runs.list_runs(&RunFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_node_failure_fails_run() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;
        let missing = Uuid::new_v4();

        let run = runs
            .trigger(
                p.id,
                CreateRun {
                    document_id: Some(missing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.result_summary.is_none());
        assert!(run.error_message.as_deref().unwrap().contains(&missing.to_string()));
        assert_timestamps_match_status(&runs.get_run(run.id).await.unwrap());
        assert!(runs.list_staged(run.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_node_type_still_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(
            &store,
            vec![
                NodeSpec::new("SpellcheckNode", json!({})),
                NodeSpec::new(LLM_PROCESSING_NODE, json!({})),
            ],
        )
        .await;

        let run = runs.trigger(p.id, text("hello")).await.unwrap();
        assert_eq!(run.status, RunStatus::Succeeded);

        let summary = run.result_summary.unwrap();
        assert_eq!(summary.chunk_count, 0);
        assert_eq!(summary.llm_output.unwrap().result, "hello");
    }

    #[tokio::test]
    async fn test_expired_deadline_fails_at_node_boundary() {
        let store = Arc::new(MemoryStore::new());
        let runs = service_with(store.clone(), recording_sink(), Some(Duration::ZERO));
        let p = pipeline(&store, full_nodes(false)).await;

        let run = runs.trigger(p.id, text("x")).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error_message.as_deref().unwrap().contains("deadline"));
        assert_timestamps_match_status(&run);
    }

    #[tokio::test]
    async fn test_hung_node_is_cut_off_by_timeout() {
        let store = Arc::new(FaultyStore {
            stall_chunks: true,
            ..Default::default()
        });
        let runs = service_with(
            store.clone(),
            recording_sink(),
            Some(Duration::from_millis(50)),
        );
        let p = pipeline(&store.inner, full_nodes(false)).await;

        let run = runs.trigger(p.id, text("x")).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error_message.as_deref().unwrap().contains("deadline"));
        assert_timestamps_match_status(&run);
        assert!(runs.list_staged(run.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_vector_index_does_not_fail_run() {
        let store = Arc::new(MemoryStore::new());
        let sink = StagingSink::new(Arc::new(StalledIndex), 4)
            .with_index_timeout(Duration::from_millis(20));
        let runs = service_with(store.clone(), sink, Some(Duration::from_secs(5)));
        let p = pipeline(&store, full_nodes(true)).await;

        let run = runs.trigger(p.id, text("x")).await.unwrap();
        assert_eq!(run.status, RunStatus::Succeeded);
        assert!(run.error_message.is_none());
        assert_timestamps_match_status(&run);
        assert_eq!(runs.list_staged(run.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unrecorded_success_is_reported_as_failure() {
        let store = Arc::new(FaultyStore {
            reject_success: true,
            ..Default::default()
        });
        let runs = service_with(store.clone(), recording_sink(), None);
        let p = pipeline(&store.inner, full_nodes(false)).await;

        let run = runs.trigger(p.id, text("x")).await.unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.result_summary.is_none());
        assert!(
            run.error_message
                .as_deref()
                .unwrap()
                .contains("failed to record run result")
        );
        assert_timestamps_match_status(&runs.get_run(run.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;

        let (a, b) = tokio::join!(
            runs.trigger(p.id, text("alpha")),
            runs.trigger(p.id, text("beta"))
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let a_summary = a.result_summary.unwrap();
        let b_summary = b.result_summary.unwrap();
        assert_eq!(a_summary.chunk_count, 1);
        assert_eq!(b_summary.chunk_count, 1);
        assert_eq!(a_summary.llm_output.unwrap().result, "alpha");
        assert_eq!(b_summary.llm_output.unwrap().result, "beta");

        let listed = runs
            .list_runs(&RunFilter {
                pipeline_id: Some(p.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        listed.iter().for_each(assert_timestamps_match_status);
    }

    #[tokio::test]
    async fn test_concurrent_runs_on_one_document_both_succeed() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store.clone());
        let p = pipeline(&store, full_nodes(false)).await;
        let document = store
            .create_document(CreateDocument::default(), None)
            .await
            .unwrap();
        let req = || CreateRun {
            document_id: Some(document.id),
            ..Default::default()
        };

        let (a, b) = tokio::join!(runs.trigger(p.id, req()), runs.trigger(p.id, req()));
        assert_eq!(a.unwrap().status, RunStatus::Succeeded);
        assert_eq!(b.unwrap().status, RunStatus::Succeeded);

        let indices: Vec<i32> = store
            .list_chunks(document.id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.chunk_index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_missing_run() {
        let store = Arc::new(MemoryStore::new());
        let runs = service(store);
        let id = Uuid::new_v4();

        assert!(matches!(runs.get_run(id).await, Err(RunError::NotFound(_))));
        assert!(matches!(runs.list_staged(id).await, Err(RunError::NotFound(_))));
    }
}
