//! Document domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

/// Ingested input registered with the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub pipeline_run_id: Option<Uuid>,
    pub source_type: SourceType,
    pub external_ref: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub storage_uri: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Where a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    FileUpload,
    FilePath,
    Email,
    #[default]
    TextPayload,
    ExternalSystem,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::FileUpload => "file_upload",
            SourceType::FilePath => "file_path",
            SourceType::Email => "email",
            SourceType::TextPayload => "text_payload",
            SourceType::ExternalSystem => "external_system",
        }
    }
}

impl FromStr for SourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file_upload" => Ok(SourceType::FileUpload),
            "file_path" => Ok(SourceType::FilePath),
            "email" => Ok(SourceType::Email),
            "text_payload" => Ok(SourceType::TextPayload),
            "external_system" => Ok(SourceType::ExternalSystem),
            other => Err(UnknownVariant {
                kind: "source type",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted text segment of a document
///
/// `(document_id, chunk_index)` is unique and indices are contiguous from 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedChunk {
    pub id: i64,
    pub document_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    pub metadata: Option<Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
