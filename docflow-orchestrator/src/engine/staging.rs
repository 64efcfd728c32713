//! Staging sink
//!
//! Writes the durable artifact of a run. The record store write is the
//! durability boundary; the vector index call that may follow is best-effort,
//! bounded by its own timeout, and its failures are only logged.

use docflow_core::domain::staging::StagedData;
use docflow_core::domain::validation::ValidationStatus;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use super::context::{ExecutionContext, NodeOutput};
use super::error::EngineResult;
use super::node::StagingConfig;
use super::vector_index::{VectorIndex, VectorRecord};
use crate::store::{NewStagedData, RecordStore, StoreResult};

/// Upper bound on a single vector index insert
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StagingSink {
    index: Arc<dyn VectorIndex>,
    embedding_dim: usize,
    index_timeout: Duration,
}

impl StagingSink {
    pub fn new(index: Arc<dyn VectorIndex>, embedding_dim: usize) -> Self {
        Self {
            index,
            embedding_dim,
            index_timeout: DEFAULT_INDEX_TIMEOUT,
        }
    }

    pub fn with_index_timeout(mut self, index_timeout: Duration) -> Self {
        self.index_timeout = index_timeout;
        self
    }

    /// Persists the artifact, then forwards an embedding when asked to
    pub async fn stage(
        &self,
        store: &dyn RecordStore,
        pipeline_id: Uuid,
        new: NewStagedData,
        write_embeddings: bool,
    ) -> StoreResult<StagedData> {
        let staged = store.create_staged(new).await?;

        if write_embeddings {
            let record = VectorRecord {
                use_case: staged.use_case,
                source_type: staged.payload_type.clone(),
                source_id: staged.id,
                pipeline_id,
                pipeline_run_id: staged.pipeline_run_id,
                embedding: self.placeholder_embedding(&staged),
                metadata: json!({ "payload": staged.payload }),
            };

            match tokio::time::timeout(self.index_timeout, self.index.insert(record)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    staged_id = %staged.id,
                    run_id = %staged.pipeline_run_id,
                    error = %e,
                    "Vector index insert failed"
                ),
                Err(_) => warn!(
                    staged_id = %staged.id,
                    run_id = %staged.pipeline_run_id,
                    timeout = ?self.index_timeout,
                    "Vector index insert timed out"
                ),
            }
        }

        Ok(staged)
    }

    /// Length of the LLM result replicated to the configured dimension
    fn placeholder_embedding(&self, staged: &StagedData) -> Vec<f32> {
        let result_len = staged
            .payload
            .pointer("/llm_output/result")
            .and_then(|v| v.as_str())
            .map(|s| s.chars().count())
            .unwrap_or(0);
        vec![result_len as f32; self.embedding_dim]
    }
}

/// Staging node: stages the latest LLM output and validation report
pub async fn stage_node(
    store: &dyn RecordStore,
    sink: &StagingSink,
    config: &StagingConfig,
    ctx: &ExecutionContext,
) -> EngineResult<NodeOutput> {
    let report = ctx.validation_report.as_ref();

    let new = NewStagedData {
        pipeline_run_id: ctx.run_id(),
        document_id: ctx.document_id,
        use_case: ctx.input.use_case,
        payload_type: config.payload_type.clone(),
        payload: json!({
            "llm_output": ctx.llm_output,
            "validation": report,
        }),
        validation_status: report.map(|r| r.status).unwrap_or(ValidationStatus::Pending),
        issues: report.map(|r| r.issues.clone()).unwrap_or_default(),
    };

    let staged = sink
        .stage(store, ctx.input.pipeline_id, new, config.write_embeddings)
        .await?;
    Ok(NodeOutput::Staged(staged.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::RunInput;
    use crate::engine::vector_index::{MemoryVectorIndex, VectorIndexError};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use docflow_core::domain::pipeline::{PipelineDefinition, UseCase};
    use docflow_core::domain::run::LlmOutput;
    use docflow_core::dto::pipeline::CreatePipeline;
    use docflow_core::dto::run::CreateRun;

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn insert(&self, _record: VectorRecord) -> Result<(), VectorIndexError> {
            Err(VectorIndexError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
    }

    struct StalledIndex;

    #[async_trait]
    impl VectorIndex for StalledIndex {
        async fn insert(&self, _record: VectorRecord) -> Result<(), VectorIndexError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    async fn context(store: &MemoryStore) -> ExecutionContext {
        let pipeline = store
            .create_pipeline(CreatePipeline {
                name: "stage".to_string(),
                description: None,
                use_case: UseCase::FoiaRequest,
                definition: PipelineDefinition::default(),
            })
            .await
            .unwrap();
        let run = store.create_run(pipeline.id, None).await.unwrap();

        let mut ctx = ExecutionContext::new(RunInput {
            run_id: run.id,
            pipeline_id: pipeline.id,
            use_case: pipeline.use_case,
            request: CreateRun::default(),
        });
        ctx.llm_output = Some(LlmOutput {
            mode: "summarize".to_string(),
            model_name: "gpt-mini".to_string(),
            prompt_template_id: "default".to_string(),
            output_schema_id: "generic".to_string(),
            result: "hello".to_string(),
        });
        ctx
    }

    #[tokio::test]
    async fn test_without_embeddings_index_is_not_called() {
        let store = MemoryStore::new();
        let index = Arc::new(MemoryVectorIndex::default());
        let sink = StagingSink::new(index.clone(), 4);
        let ctx = context(&store).await;

        let output = stage_node(&store, &sink, &StagingConfig::default(), &ctx)
            .await
            .unwrap();

        let staged = store.list_staged_for_run(ctx.run_id()).await.unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(output, NodeOutput::Staged(staged[0].id));
        assert_eq!(staged[0].payload_type, "generic_structured_output");
        assert_eq!(staged[0].validation_status, ValidationStatus::Pending);
        assert!(staged[0].issues.is_empty());
        assert_eq!(staged[0].payload["llm_output"]["result"], "hello");
        assert!(staged[0].payload["validation"].is_null());
        assert!(index.records().is_empty());
    }

    #[tokio::test]
    async fn test_with_embeddings_index_is_called_once() {
        let store = MemoryStore::new();
        let index = Arc::new(MemoryVectorIndex::default());
        let sink = StagingSink::new(index.clone(), 4);
        let ctx = context(&store).await;
        let config = StagingConfig {
            payload_type: "foia_summary".to_string(),
            write_embeddings: true,
        };

        stage_node(&store, &sink, &config, &ctx).await.unwrap();

        let staged = store.list_staged_for_run(ctx.run_id()).await.unwrap();
        let records = index.records();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.use_case, UseCase::FoiaRequest);
        assert_eq!(record.source_type, "foia_summary");
        assert_eq!(record.source_id, staged[0].id);
        assert_eq!(record.pipeline_id, ctx.input.pipeline_id);
        assert_eq!(record.pipeline_run_id, ctx.run_id());
        assert_eq!(record.embedding, vec![5.0; 4]);
        assert_eq!(record.metadata["payload"], staged[0].payload);
    }

    #[tokio::test]
    async fn test_index_failure_does_not_fail_staging() {
        let store = MemoryStore::new();
        let sink = StagingSink::new(Arc::new(FailingIndex), 4);
        let ctx = context(&store).await;
        let config = StagingConfig {
            write_embeddings: true,
            ..Default::default()
        };

        assert!(stage_node(&store, &sink, &config, &ctx).await.is_ok());
        assert_eq!(store.list_staged_for_run(ctx.run_id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_index_is_abandoned_after_timeout() {
        let store = MemoryStore::new();
        let sink = StagingSink::new(Arc::new(StalledIndex), 4)
            .with_index_timeout(Duration::from_millis(20));
        let ctx = context(&store).await;
        let config = StagingConfig {
            write_embeddings: true,
            ..Default::default()
        };

        let output = tokio::time::timeout(
            Duration::from_secs(5),
            stage_node(&store, &sink, &config, &ctx),
        )
        .await
        .expect("staging should not wait for a stalled index")
        .unwrap();

        let staged = store.list_staged_for_run(ctx.run_id()).await.unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(output, NodeOutput::Staged(staged[0].id));
    }
}
