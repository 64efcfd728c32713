//! In-memory record store
//!
//! Mirrors the Postgres schema rules (unique names, foreign keys, cascades,
//! guarded run transitions) so engine behaviour is identical on both stores.
//! Used when no database is configured and throughout the test suite.

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
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{NewStagedData, RecordStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    pipelines: HashMap<Uuid, Pipeline>,
    runs: HashMap<Uuid, PipelineRun>,
    documents: HashMap<Uuid, Document>,
    chunks: Vec<IngestedChunk>,
    staged: Vec<StagedData>,
    rulesets: Vec<ValidationRuleSet>,
    next_chunk_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies a guarded lifecycle update to a run
    fn transition(
        &self,
        id: Uuid,
        from: RunStatus,
        to: RunStatus,
        apply: impl FnOnce(&mut PipelineRun),
    ) -> StoreResult<PipelineRun> {
        let mut tables = self.write();
        let run = tables
            .runs
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("run", id))?;

        if run.status != from {
            return Err(StoreError::InvalidTransition {
                id,
                from: run.status,
                to,
            });
        }

        run.status = to;
        apply(run);
        Ok(run.clone())
    }
}

fn name_conflict(kind: &str, name: &str) -> StoreError {
    StoreError::Conflict(format!("{} name '{}' is already taken", kind, name))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
        let mut tables = self.write();
        if tables.pipelines.values().any(|p| p.name == req.name) {
            return Err(name_conflict("pipeline", &req.name));
        }

        let now = chrono::Utc::now();
        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            use_case: req.use_case,
            definition: req.definition,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.pipelines.insert(pipeline.id, pipeline.clone());
        Ok(pipeline)
    }

    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(self.read().pipelines.get(&id).cloned())
    }

    async fn list_pipelines(&self, filter: &PipelineFilter) -> StoreResult<Vec<Pipeline>> {
        let mut pipelines: Vec<Pipeline> = self
            .read()
            .pipelines
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        pipelines.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pipelines)
    }

    async fn update_pipeline(
        &self,
        id: Uuid,
        req: UpdatePipeline,
    ) -> StoreResult<Option<Pipeline>> {
        let mut tables = self.write();

        if let Some(name) = &req.name {
            if tables
                .pipelines
                .values()
                .any(|p| p.id != id && &p.name == name)
            {
                return Err(name_conflict("pipeline", name));
            }
        }

        let Some(pipeline) = tables.pipelines.get_mut(&id) else {
            return Ok(None);
        };
        req.apply_to(pipeline);
        pipeline.updated_at = chrono::Utc::now();
        Ok(Some(pipeline.clone()))
    }

    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.write();
        if tables.pipelines.remove(&id).is_none() {
            return Ok(false);
        }

        let removed_runs: Vec<Uuid> = tables
            .runs
            .values()
            .filter(|r| r.pipeline_id == id)
            .map(|r| r.id)
            .collect();
        for run_id in &removed_runs {
            tables.runs.remove(run_id);
        }
        tables
            .staged
            .retain(|s| !removed_runs.contains(&s.pipeline_run_id));
        for document in tables.documents.values_mut() {
            if document
                .pipeline_run_id
                .is_some_and(|run_id| removed_runs.contains(&run_id))
            {
                document.pipeline_run_id = None;
            }
        }
        Ok(true)
    }

    async fn create_run(
        &self,
        pipeline_id: Uuid,
        input_ref: Option<String>,
    ) -> StoreResult<PipelineRun> {
        let mut tables = self.write();
        if !tables.pipelines.contains_key(&pipeline_id) {
            return Err(StoreError::MissingReference(format!(
                "pipeline {}",
                pipeline_id
            )));
        }

        let run = PipelineRun {
            id: Uuid::new_v4(),
            pipeline_id,
            status: RunStatus::Queued,
            input_ref,
            result_summary: None,
            error_message: None,
            logs_location: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        };
        tables.runs.insert(run.id, run.clone());
        Ok(run)
    }

    async fn get_run(&self, id: Uuid) -> StoreResult<Option<PipelineRun>> {
        Ok(self.read().runs.get(&id).cloned())
    }

    async fn list_runs(&self, filter: &RunFilter) -> StoreResult<Vec<PipelineRun>> {
        let mut runs: Vec<PipelineRun> = self
            .read()
            .runs
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs.truncate(filter.limit());
        Ok(runs)
    }

    async fn mark_run_running(&self, id: Uuid) -> StoreResult<PipelineRun> {
        self.transition(id, RunStatus::Queued, RunStatus::Running, |run| {
            run.started_at = Some(chrono::Utc::now());
        })
    }

    async fn mark_run_succeeded(&self, id: Uuid, summary: &RunSummary) -> StoreResult<PipelineRun> {
        let summary = summary.clone();
        self.transition(id, RunStatus::Running, RunStatus::Succeeded, |run| {
            run.result_summary = Some(summary);
            run.completed_at = Some(chrono::Utc::now());
        })
    }

    async fn mark_run_failed(&self, id: Uuid, error_message: &str) -> StoreResult<PipelineRun> {
        self.transition(id, RunStatus::Running, RunStatus::Failed, |run| {
            run.error_message = Some(error_message.to_string());
            run.completed_at = Some(chrono::Utc::now());
        })
    }

    async fn create_document(
        &self,
        req: CreateDocument,
        pipeline_run_id: Option<Uuid>,
    ) -> StoreResult<Document> {
        let mut tables = self.write();
        if let Some(run_id) = pipeline_run_id {
            if !tables.runs.contains_key(&run_id) {
                return Err(StoreError::MissingReference(format!("run {}", run_id)));
            }
        }

        let document = Document {
            id: Uuid::new_v4(),
            pipeline_run_id,
            source_type: req.source_type,
            external_ref: req.external_ref,
            file_name: req.file_name,
            mime_type: req.mime_type,
            storage_uri: req.storage_uri,
            metadata: req.metadata,
            created_at: chrono::Utc::now(),
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: Uuid) -> StoreResult<Option<Document>> {
        Ok(self.read().documents.get(&id).cloned())
    }

    async fn append_chunk(
        &self,
        document_id: Uuid,
        content: &str,
        metadata: Option<Value>,
    ) -> StoreResult<IngestedChunk> {
        let mut tables = self.write();
        if !tables.documents.contains_key(&document_id) {
            return Err(StoreError::MissingReference(format!(
                "document {}",
                document_id
            )));
        }

        let chunk_index = tables
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .map(|c| c.chunk_index + 1)
            .max()
            .unwrap_or(0);

        tables.next_chunk_id += 1;
        let chunk = IngestedChunk {
            id: tables.next_chunk_id,
            document_id,
            chunk_index,
            content: content.to_string(),
            metadata,
            created_at: chrono::Utc::now(),
        };
        tables.chunks.push(chunk.clone());
        Ok(chunk)
    }

    async fn list_chunks(&self, document_id: Uuid) -> StoreResult<Vec<IngestedChunk>> {
        let mut chunks: Vec<IngestedChunk> = self
            .read()
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.chunk_index);
        Ok(chunks)
    }

    async fn create_staged(&self, new: NewStagedData) -> StoreResult<StagedData> {
        let mut tables = self.write();
        if !tables.runs.contains_key(&new.pipeline_run_id) {
            return Err(StoreError::MissingReference(format!(
                "run {}",
                new.pipeline_run_id
            )));
        }
        if let Some(document_id) = new.document_id {
            if !tables.documents.contains_key(&document_id) {
                return Err(StoreError::MissingReference(format!(
                    "document {}",
                    document_id
                )));
            }
        }

        let now = chrono::Utc::now();
        let staged = StagedData {
            id: Uuid::new_v4(),
            pipeline_run_id: new.pipeline_run_id,
            document_id: new.document_id,
            use_case: new.use_case,
            payload_type: new.payload_type,
            payload: new.payload,
            validation_status: new.validation_status,
            issues: new.issues,
            created_at: now,
            updated_at: now,
        };
        tables.staged.push(staged.clone());
        Ok(staged)
    }

    async fn list_staged_for_run(&self, run_id: Uuid) -> StoreResult<Vec<StagedData>> {
        Ok(self
            .read()
            .staged
            .iter()
            .filter(|s| s.pipeline_run_id == run_id)
            .cloned()
            .collect())
    }

    async fn create_ruleset(&self, req: CreateRuleSet) -> StoreResult<ValidationRuleSet> {
        let mut tables = self.write();
        if tables.rulesets.iter().any(|r| r.name == req.name) {
            return Err(name_conflict("ruleset", &req.name));
        }

        let ruleset = ValidationRuleSet {
            id: Uuid::new_v4(),
            name: req.name,
            use_case: req.use_case,
            description: req.description,
            config: req.config,
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        tables.rulesets.push(ruleset.clone());
        Ok(ruleset)
    }

    async fn find_ruleset(&self, name: &str) -> StoreResult<Option<ValidationRuleSet>> {
        Ok(self.read().rulesets.iter().find(|r| r.name == name).cloned())
    }

    async fn list_rulesets(&self) -> StoreResult<Vec<ValidationRuleSet>> {
        let mut rulesets = self.read().rulesets.clone();
        rulesets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rulesets)
    }
}
