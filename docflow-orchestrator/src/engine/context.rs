//! Execution context for pipeline runs
//!
//! One [`ExecutionContext`] is created per run and dropped when the run ends.
//! Handlers only read it; what they produce comes back as a [`NodeOutput`]
//! that the orchestrator merges with [`ExecutionContext::apply`].

use docflow_core::domain::pipeline::UseCase;
use docflow_core::domain::run::{LlmOutput, RunSummary};
use docflow_core::domain::validation::ValidationReport;
use docflow_core::dto::run::CreateRun;
use tokio::time::Instant;
use uuid::Uuid;

use super::error::{EngineError, EngineResult};

/// What a run was asked to process
#[derive(Debug, Clone)]
pub struct RunInput {
    pub run_id: Uuid,
    pub pipeline_id: Uuid,
    pub use_case: UseCase,
    pub request: CreateRun,
}

/// Contribution of one node to the context
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    Ingested { document_id: Uuid, chunk: String },
    Processed(LlmOutput),
    Validated(ValidationReport),
    Staged(Uuid),
}

/// Accumulator threaded through the nodes of a single run
#[derive(Debug)]
pub struct ExecutionContext {
    pub input: RunInput,
    /// Document created or reused by the first ingestion node
    pub document_id: Option<Uuid>,
    pub chunks: Vec<String>,
    pub llm_output: Option<LlmOutput>,
    pub validation_report: Option<ValidationReport>,
    /// Staged artifacts written so far, in order
    pub staged: Vec<Uuid>,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    pub fn new(input: RunInput) -> Self {
        Self {
            input,
            document_id: None,
            chunks: Vec::new(),
            llm_output: None,
            validation_report: None,
            staged: Vec::new(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.input.run_id
    }

    /// Fails once the run deadline has passed
    ///
    /// Called between nodes; a node already in flight is never interrupted here.
    pub fn check_deadline(&self, node_index: usize) -> EngineResult<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(EngineError::DeadlineExceeded { node_index })
            }
            _ => Ok(()),
        }
    }

    /// Merges a node's output; later outputs of a kind replace earlier ones
    pub fn apply(&mut self, output: NodeOutput) {
        match output {
            NodeOutput::Ingested { document_id, chunk } => {
                self.document_id = Some(document_id);
                self.chunks.push(chunk);
            }
            NodeOutput::Processed(llm_output) => self.llm_output = Some(llm_output),
            NodeOutput::Validated(report) => self.validation_report = Some(report),
            NodeOutput::Staged(staged_id) => self.staged.push(staged_id),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            chunk_count: self.chunks.len(),
            llm_output: self.llm_output.clone(),
            validation_report: self.validation_report.clone(),
        }
    }
}
