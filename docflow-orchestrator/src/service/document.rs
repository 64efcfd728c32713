//! Document Service
//!
//! Registration and lookup of ingested documents.

use docflow_core::domain::document::Document;
use docflow_core::dto::document::{CreateDocument, DocumentDetails};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Register a document outside of any run
pub async fn register_document(store: &dyn RecordStore, req: CreateDocument) -> Result<Document> {
    let document = store.create_document(req, None).await?;

    tracing::info!(
        "Document registered: {} ({})",
        document.id,
        document.source_type
    );

    Ok(document)
}

/// Get a document together with its chunks
pub async fn get_document(store: &dyn RecordStore, id: Uuid) -> Result<DocumentDetails> {
    let document = store
        .get_document(id)
        .await?
        .ok_or(DocumentError::NotFound(id))?;
    let chunks = store.list_chunks(id).await?;

    Ok(DocumentDetails { document, chunks })
}
