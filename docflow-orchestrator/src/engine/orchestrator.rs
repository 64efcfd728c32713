//! Node dispatch loop
//!
//! Walks a pipeline's nodes in declared order, hands each to its handler and
//! merges the result into the run's [`ExecutionContext`]. Edges in the
//! definition are not consulted.

use docflow_core::domain::pipeline::Pipeline;
use docflow_core::domain::run::RunSummary;
use std::sync::Arc;
use tracing::{info, warn};

use super::context::{ExecutionContext, NodeOutput};
use super::error::EngineResult;
use super::node::Node;
use super::staging::{StagingSink, stage_node};
use super::validation::{RulesetRegistry, validate};
use super::{ingestion, processing};
use crate::store::RecordStore;

pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    rulesets: RulesetRegistry,
    sink: StagingSink,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn RecordStore>, rulesets: RulesetRegistry, sink: StagingSink) -> Self {
        Self {
            store,
            rulesets,
            sink,
        }
    }

    /// Executes every node of `pipeline` against `ctx`
    ///
    /// The first handler error aborts the run. Unknown node types are skipped.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        mut ctx: ExecutionContext,
    ) -> EngineResult<RunSummary> {
        let run_id = ctx.run_id();

        for (node_index, spec) in pipeline.definition.nodes.iter().enumerate() {
            ctx.check_deadline(node_index)?;

            let Some(node) = Node::from_spec(spec)? else {
                warn!(
                    run_id = %run_id,
                    node_index,
                    node_type = %spec.node_type,
                    "Unknown node type skipped"
                );
                continue;
            };

            info!(
                run_id = %run_id,
                node_index,
                node_type = node.type_name(),
                "Executing node"
            );

            let output = self.dispatch(&node, &ctx).await?;
            ctx.apply(output);
        }

        Ok(ctx.summary())
    }

    async fn dispatch(&self, node: &Node, ctx: &ExecutionContext) -> EngineResult<NodeOutput> {
        let store = self.store.as_ref();
        match node {
            Node::Ingestion(config) => ingestion::ingest(store, config, ctx).await,
            Node::LlmProcessing(config) => Ok(processing::process(config, ctx)),
            Node::Validation(config) => validate(store, &self.rulesets, config, ctx).await,
            Node::Staging(config) => stage_node(store, &self.sink, config, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::RunInput;
    use crate::engine::error::EngineError;
    use crate::engine::node::{
        INGESTION_NODE, LLM_PROCESSING_NODE, STAGING_NODE, VALIDATION_NODE,
    };
    use crate::engine::vector_index::MemoryVectorIndex;
    use crate::store::MemoryStore;
    use docflow_core::domain::pipeline::{NodeSpec, PipelineDefinition, UseCase};
    use docflow_core::domain::validation::ValidationStatus;
    use docflow_core::dto::pipeline::CreatePipeline;
    use docflow_core::dto::run::CreateRun;
    use serde_json::json;
    use tokio::time::Instant;

    struct Harness {
        store: Arc<MemoryStore>,
        index: Arc<MemoryVectorIndex>,
        orchestrator: Orchestrator,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let index = Arc::new(MemoryVectorIndex::default());
        let orchestrator = Orchestrator::new(
            store.clone(),
            RulesetRegistry::new(),
            StagingSink::new(index.clone(), 8),
        );
        Harness {
            store,
            index,
            orchestrator,
        }
    }

    async fn pipeline(store: &MemoryStore, nodes: Vec<NodeSpec>) -> Pipeline {
        store
            .create_pipeline(CreatePipeline {
                name: format!("pipeline-{}", uuid::Uuid::new_v4()),
                description: None,
                use_case: UseCase::InvoiceProcessing,
                definition: PipelineDefinition {
                    nodes,
                    ..Default::default()
                },
            })
            .await
            .unwrap()
    }

    async fn context(store: &MemoryStore, pipeline: &Pipeline, text: &str) -> ExecutionContext {
        let run = store.create_run(pipeline.id, None).await.unwrap();
        ExecutionContext::new(RunInput {
            run_id: run.id,
            pipeline_id: pipeline.id,
            use_case: pipeline.use_case,
            request: CreateRun {
                text_payload: Some(text.to_string()),
                ..Default::default()
            },
        })
    }

    fn full_pipeline() -> Vec<NodeSpec> {
        vec![
            NodeSpec::new(INGESTION_NODE, json!({})),
            NodeSpec::new(LLM_PROCESSING_NODE, json!({"mode": "summarize"})),
            NodeSpec::new(VALIDATION_NODE, json!({})),
            NodeSpec::new(STAGING_NODE, json!({"write_embeddings": true})),
        ]
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_summary_and_artifact() {
        let h = harness();
        let p = pipeline(&h.store, full_pipeline()).await;
        let ctx = context(&h.store, &p, "Invoice 42 total 100 EUR").await;
        let run_id = ctx.run_id();

        let summary = h.orchestrator.execute(&p, ctx).await.unwrap();

        assert_eq!(summary.chunk_count, 1);
        assert_eq!(summary.llm_output.unwrap().result, "Invoice 42 total 100 EUR");
        assert_eq!(
            summary.validation_report.unwrap().status,
            ValidationStatus::Passed
        );

        let staged = h.store.list_staged_for_run(run_id).await.unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].validation_status, ValidationStatus::Passed);
        assert!(staged[0].document_id.is_some());
        assert_eq!(h.index.records().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_node_is_skipped() {
        let h = harness();
        let p = pipeline(
            &h.store,
            vec![
                NodeSpec::new(INGESTION_NODE, json!({})),
                NodeSpec::new("TranslationNode", json!({"target": "fr"})),
                NodeSpec::new(LLM_PROCESSING_NODE, json!({})),
            ],
        )
        .await;
        let ctx = context(&h.store, &p, "bonjour").await;

        let summary = h.orchestrator.execute(&p, ctx).await.unwrap();
        assert_eq!(summary.chunk_count, 1);
        assert_eq!(summary.llm_output.unwrap().result, "bonjour");
        assert!(summary.validation_report.is_none());
    }

    #[tokio::test]
    async fn test_summarize_500_chars_keeps_200() {
        let h = harness();
        let p = pipeline(
            &h.store,
            vec![
                NodeSpec::new(INGESTION_NODE, json!({})),
                NodeSpec::new(LLM_PROCESSING_NODE, json!({"mode": "summarize"})),
            ],
        )
        .await;
        let text: String = ('a'..='z').cycle().take(500).collect();
        let ctx = context(&h.store, &p, &text).await;

        let summary = h.orchestrator.execute(&p, ctx).await.unwrap();
        assert_eq!(summary.llm_output.unwrap().result, text[..200]);
    }

    #[tokio::test]
    async fn test_malformed_config_aborts_run() {
        let h = harness();
        let p = pipeline(
            &h.store,
            vec![
                NodeSpec::new(INGESTION_NODE, json!({})),
                NodeSpec::new(STAGING_NODE, json!({"write_embeddings": "yes"})),
            ],
        )
        .await;
        let ctx = context(&h.store, &p, "x").await;
        let run_id = ctx.run_id();

        let err = h.orchestrator.execute(&p, ctx).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
        assert!(h.store.list_staged_for_run(run_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expired_deadline_stops_before_first_node() {
        let h = harness();
        let p = pipeline(&h.store, full_pipeline()).await;
        let ctx = context(&h.store, &p, "x")
            .await
            .with_deadline(Some(Instant::now()));
        let run_id = ctx.run_id();

        let err = h.orchestrator.execute(&p, ctx).await.unwrap_err();
        assert!(matches!(err, EngineError::DeadlineExceeded { node_index: 0 }));
        assert!(h.store.list_staged_for_run(run_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_runs_keep_separate_contexts() {
        let h = harness();
        let p = pipeline(&h.store, full_pipeline()).await;
        let first = context(&h.store, &p, "first document").await;
        let second = context(&h.store, &p, "second document").await;
        let (first_run, second_run) = (first.run_id(), second.run_id());

        let (a, b) = tokio::join!(
            h.orchestrator.execute(&p, first),
            h.orchestrator.execute(&p, second)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.chunk_count, 1);
        assert_eq!(b.chunk_count, 1);
        assert_eq!(a.llm_output.unwrap().result, "first document");
        assert_eq!(b.llm_output.unwrap().result, "second document");

        let a_staged = h.store.list_staged_for_run(first_run).await.unwrap();
        let b_staged = h.store.list_staged_for_run(second_run).await.unwrap();
        assert_ne!(a_staged[0].document_id, b_staged[0].document_id);
    }
}
