//! Document ingestion node

use docflow_core::dto::document::CreateDocument;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::context::{ExecutionContext, NodeOutput};
use super::error::{EngineError, EngineResult};
use super::node::IngestionConfig;
use crate::store::RecordStore;

/// Chunk content used when the run carried no text
pub const PLACEHOLDER_TEXT: &str = "Sample document payload";

/// Registers (or reuses) the run's document and appends one chunk to it
pub async fn ingest(
    store: &dyn RecordStore,
    config: &IngestionConfig,
    ctx: &ExecutionContext,
) -> EngineResult<NodeOutput> {
    let document_id = resolve_document(store, config, ctx).await?;

    let text = ctx
        .input
        .request
        .text_payload
        .as_deref()
        .unwrap_or(PLACEHOLDER_TEXT);

    let chunk = store
        .append_chunk(document_id, text, Some(json!({ "generated": true })))
        .await?;

    debug!(
        run_id = %ctx.run_id(),
        document_id = %document_id,
        chunk_index = chunk.chunk_index,
        "Chunk ingested"
    );

    Ok(NodeOutput::Ingested {
        document_id,
        chunk: chunk.content,
    })
}

/// At most one document per run: the one already in context, the one the
/// caller referenced, or a fresh one registered against the run
async fn resolve_document(
    store: &dyn RecordStore,
    config: &IngestionConfig,
    ctx: &ExecutionContext,
) -> EngineResult<Uuid> {
    if let Some(id) = ctx.document_id {
        return Ok(id);
    }

    let request = &ctx.input.request;
    if let Some(id) = request.document_id {
        return match store.get_document(id).await? {
            Some(document) => Ok(document.id),
            None => Err(EngineError::DocumentNotFound(id)),
        };
    }

    let document = store
        .create_document(
            CreateDocument {
                source_type: config.source_type,
                external_ref: request.input_ref.clone(),
                file_name: request.file_path.clone(),
                mime_type: None,
                storage_uri: request.file_path.clone(),
                metadata: Some(json!({})),
            },
            Some(ctx.run_id()),
        )
        .await?;

    debug!(run_id = %ctx.run_id(), document_id = %document.id, "Document registered");
    Ok(document.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::RunInput;
    use crate::store::MemoryStore;
    use docflow_core::domain::document::SourceType;
    use docflow_core::domain::pipeline::{PipelineDefinition, UseCase};
    use docflow_core::dto::pipeline::CreatePipeline;
    use docflow_core::dto::run::CreateRun;

    async fn context(store: &MemoryStore, request: CreateRun) -> ExecutionContext {
        let pipeline = store
            .create_pipeline(CreatePipeline {
                name: "ingest".to_string(),
                description: None,
                use_case: UseCase::Generic,
                definition: PipelineDefinition::default(),
            })
            .await
            .unwrap();
        let run = store.create_run(pipeline.id, None).await.unwrap();

        ExecutionContext::new(RunInput {
            run_id: run.id,
            pipeline_id: pipeline.id,
            use_case: pipeline.use_case,
            request,
        })
    }

    #[tokio::test]
    async fn test_first_ingestion_registers_document() {
        let store = MemoryStore::new();
        let ctx = context(
            &store,
            CreateRun {
                input_ref: Some("ticket-7".to_string()),
                file_path: Some("/data/in.pdf".to_string()),
                ..Default::default()
            },
        )
        .await;

        let config = IngestionConfig {
            source_type: SourceType::FilePath,
        };
        let NodeOutput::Ingested { document_id, chunk } =
            ingest(&store, &config, &ctx).await.unwrap()
        else {
            panic!("expected ingestion output");
        };

        assert_eq!(chunk, PLACEHOLDER_TEXT);

        let document = store.get_document(document_id).await.unwrap().unwrap();
        assert_eq!(document.pipeline_run_id, Some(ctx.run_id()));
        assert_eq!(document.source_type, SourceType::FilePath);
        assert_eq!(document.external_ref.as_deref(), Some("ticket-7"));
        assert_eq!(document.storage_uri.as_deref(), Some("/data/in.pdf"));

        let chunks = store.list_chunks(document_id).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].metadata, Some(json!({ "generated": true })));
    }

    #[tokio::test]
    async fn test_second_ingestion_reuses_document() {
        let store = MemoryStore::new();
        let mut ctx = context(
            &store,
            CreateRun {
                text_payload: Some("hello".to_string()),
                ..Default::default()
            },
        )
        .await;
        let config = IngestionConfig::default();

        let first = ingest(&store, &config, &ctx).await.unwrap();
        ctx.apply(first);
        let second = ingest(&store, &config, &ctx).await.unwrap();
        ctx.apply(second);

        let document_id = ctx.document_id.unwrap();
        let indices: Vec<i32> = store
            .list_chunks(document_id)
            .await
            .unwrap()
            .iter()
            .map(|c| c.chunk_index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(ctx.chunks, vec!["hello", "hello"]);
    }

    #[tokio::test]
    async fn test_referenced_document_must_exist() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();
        let ctx = context(
            &store,
            CreateRun {
                document_id: Some(missing),
                ..Default::default()
            },
        )
        .await;

        let err = ingest(&store, &IngestionConfig::default(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DocumentNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_referenced_document_is_reused() {
        let store = MemoryStore::new();
        let existing = store
            .create_document(CreateDocument::default(), None)
            .await
            .unwrap();
        let ctx = context(
            &store,
            CreateRun {
                document_id: Some(existing.id),
                ..Default::default()
            },
        )
        .await;

        let output = ingest(&store, &IngestionConfig::default(), &ctx)
            .await
            .unwrap();
        assert!(matches!(
            output,
            NodeOutput::Ingested { document_id, .. } if document_id == existing.id
        ));
    }
}
