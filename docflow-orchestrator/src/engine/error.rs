//! Engine errors

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures raised while dispatching the nodes of a run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A node's config did not match the shape its handler expects
    #[error("invalid config for {node_type}: {source}")]
    InvalidConfig {
        node_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("document {0} not found")]
    DocumentNotFound(Uuid),

    /// The run deadline passed before the next node could start
    #[error("run deadline exceeded before node {node_index}")]
    DeadlineExceeded { node_index: usize },
}
