//! Run-related API endpoints

use crate::DocflowClient;
use crate::error::Result;
use docflow_core::domain::run::PipelineRun;
use docflow_core::domain::staging::StagedData;
use docflow_core::dto::run::{CreateRun, RunFilter};
use uuid::Uuid;

impl DocflowClient {
    // =============================================================================
    // Runs
    // =============================================================================

    /// Run a pipeline
    ///
    /// The orchestrator executes the run before answering, so the returned
    /// run is already `succeeded` or `failed`.
    pub async fn trigger_run(&self, pipeline_id: Uuid, req: CreateRun) -> Result<PipelineRun> {
        let response = self
            .client
            .post(self.url(&format!("/pipelines/{}/run", pipeline_id)))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: Uuid) -> Result<PipelineRun> {
        let response = self
            .client
            .get(self.url(&format!("/runs/{}", run_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List runs, newest first
    pub async fn list_runs(&self, filter: &RunFilter) -> Result<Vec<PipelineRun>> {
        let response = self
            .client
            .get(self.url("/runs"))
            .query(filter)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the artifacts staged by a run
    pub async fn list_staged(&self, run_id: Uuid) -> Result<Vec<StagedData>> {
        let response = self
            .client
            .get(self.url(&format!("/runs/{}/staged", run_id)))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
