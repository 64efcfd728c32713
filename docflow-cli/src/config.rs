//! Configuration module
//!
//! Settings shared by every command.

use docflow_client::DocflowClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the orchestrator API
    pub api_url: String,
}

impl Config {
    pub fn client(&self) -> DocflowClient {
        DocflowClient::new(&self.api_url)
    }
}
