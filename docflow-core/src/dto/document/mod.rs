//! Document DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::document::{Document, IngestedChunk, SourceType};

/// Request to register a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDocument {
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Document together with its ingested chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDetails {
    #[serde(flatten)]
    pub document: Document,
    pub chunks: Vec<IngestedChunk>,
}
