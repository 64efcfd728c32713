//! Staged artifact domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::pipeline::UseCase;
use super::validation::ValidationStatus;

/// Durable artifact written by a staging node
///
/// Always scoped to a run; written once per staging node execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedData {
    pub id: Uuid,
    pub pipeline_run_id: Uuid,
    pub document_id: Option<Uuid>,
    pub use_case: UseCase,
    pub payload_type: String,
    pub payload: Value,
    pub validation_status: ValidationStatus,
    pub issues: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
