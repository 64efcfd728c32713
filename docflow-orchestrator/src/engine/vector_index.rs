//! Vector index
//!
//! Optional side channel fed by staging nodes that request embeddings. The
//! HTTP implementation talks to a Milvus-compatible REST endpoint.

use async_trait::async_trait;
use docflow_core::domain::pipeline::UseCase;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("index rejected insert ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// One embedding row with its identifying metadata
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub use_case: UseCase,
    pub source_type: String,
    pub source_id: Uuid,
    pub pipeline_id: Uuid,
    pub pipeline_run_id: Uuid,
    pub embedding: Vec<f32>,
    pub metadata: Value,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn insert(&self, record: VectorRecord) -> Result<(), VectorIndexError>;
}

/// Used when no endpoint is configured
pub struct NoopVectorIndex;

#[async_trait]
impl VectorIndex for NoopVectorIndex {
    async fn insert(&self, _record: VectorRecord) -> Result<(), VectorIndexError> {
        Ok(())
    }
}

pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl HttpVectorIndex {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
        }
    }
}

/// Row layout of the collection; ids and metadata are stored as strings
#[derive(Serialize)]
struct IndexRow<'a> {
    use_case: &'a str,
    source_type: &'a str,
    source_id: String,
    pipeline_id: String,
    pipeline_run_id: String,
    embedding: &'a [f32],
    metadata: String,
}

impl<'a> From<&'a VectorRecord> for IndexRow<'a> {
    fn from(record: &'a VectorRecord) -> Self {
        Self {
            use_case: record.use_case.as_str(),
            source_type: &record.source_type,
            source_id: record.source_id.to_string(),
            pipeline_id: record.pipeline_id.to_string(),
            pipeline_run_id: record.pipeline_run_id.to_string(),
            embedding: &record.embedding,
            metadata: record.metadata.to_string(),
        }
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn insert(&self, record: VectorRecord) -> Result<(), VectorIndexError> {
        let url = format!("{}/v2/vectordb/entities/insert", self.base_url);
        let body = json!({
            "collectionName": self.collection,
            "data": [IndexRow::from(&record)],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VectorIndexError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // Milvus reports application errors with a 200 and a non-zero code
        let reply: Value = response.json().await?;
        if let Some(code) = reply.get("code").and_then(Value::as_i64) {
            if code != 0 {
                let message = reply
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(VectorIndexError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        debug!(source_id = %record.source_id, collection = %self.collection, "Embedding inserted");
        Ok(())
    }
}

/// Keeps inserted records in memory
#[cfg(test)]
#[derive(Default)]
pub struct MemoryVectorIndex {
    records: std::sync::Mutex<Vec<VectorRecord>>,
}

#[cfg(test)]
impl MemoryVectorIndex {
    pub fn records(&self) -> Vec<VectorRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn insert(&self, record: VectorRecord) -> Result<(), VectorIndexError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}
