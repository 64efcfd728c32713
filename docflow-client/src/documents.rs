//! Document-related API endpoints

use crate::DocflowClient;
use crate::error::Result;
use docflow_core::domain::document::Document;
use docflow_core::dto::document::{CreateDocument, DocumentDetails};
use uuid::Uuid;

impl DocflowClient {
    /// Register a document
    pub async fn register_document(&self, req: CreateDocument) -> Result<Document> {
        let response = self
            .client
            .post(self.url("/documents"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a document together with its chunks
    pub async fn get_document(&self, document_id: Uuid) -> Result<DocumentDetails> {
        let response = self
            .client
            .get(self.url(&format!("/documents/{}", document_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
