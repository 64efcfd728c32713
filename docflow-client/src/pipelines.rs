//! Pipeline-related API endpoints

use crate::DocflowClient;
use crate::error::Result;
use docflow_core::domain::pipeline::Pipeline;
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, PipelineSummary, UpdatePipeline};
use uuid::Uuid;

impl DocflowClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Register a new pipeline
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<Pipeline> {
        let response = self
            .client
            .post(self.url("/pipelines"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List pipelines matching `filter`
    pub async fn list_pipelines(&self, filter: &PipelineFilter) -> Result<Vec<PipelineSummary>> {
        let response = self
            .client
            .get(self.url("/pipelines"))
            .query(filter)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        let response = self
            .client
            .get(self.url(&format!("/pipelines/{}", pipeline_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Replace the given fields of a pipeline
    pub async fn update_pipeline(&self, pipeline_id: Uuid, req: UpdatePipeline) -> Result<Pipeline> {
        let response = self
            .client
            .put(self.url(&format!("/pipelines/{}", pipeline_id)))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline and its runs
    pub async fn delete_pipeline(&self, pipeline_id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/pipelines/{}", pipeline_id)))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
