//! Validation ruleset API endpoints

use crate::DocflowClient;
use crate::error::Result;
use docflow_core::domain::validation::ValidationRuleSet;
use docflow_core::dto::ruleset::CreateRuleSet;

impl DocflowClient {
    /// Register a validation ruleset
    pub async fn create_ruleset(&self, req: CreateRuleSet) -> Result<ValidationRuleSet> {
        let response = self
            .client
            .post(self.url("/rulesets"))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all rulesets
    pub async fn list_rulesets(&self) -> Result<Vec<ValidationRuleSet>> {
        let response = self.client.get(self.url("/rulesets")).send().await?;

        self.handle_response(response).await
    }
}
