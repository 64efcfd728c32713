//! Docflow HTTP Client
//!
//! A simple, type-safe HTTP client for the Docflow orchestrator API.
//!
//! # Example
//!
//! ```no_run
//! use docflow_client::DocflowClient;
//! use docflow_core::dto::run::CreateRun;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DocflowClient::new("http://localhost:8080");
//!
//!     let run = client
//!         .trigger_run(
//!             Uuid::new_v4(),
//!             CreateRun {
//!                 text_payload: Some("Invoice #42".to_string()),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!
//!     println!("Run {} finished as {}", run.id, run.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod documents;
mod pipelines;
mod rulesets;
mod runs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Docflow orchestrator API
///
/// Methods are grouped by resource:
/// - Pipeline management (create, list, get, update, delete)
/// - Runs (trigger, get, list, staged artifacts)
/// - Documents and validation rulesets
#[derive(Debug, Clone)]
pub struct DocflowClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl DocflowClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use docflow_client::DocflowClient;
    ///
    /// let client = DocflowClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// Runs execute synchronously on the server, so long pipelines may need
    /// a longer request timeout than the default.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = DocflowClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = DocflowClient::new("http://localhost:8080/");
        assert_eq!(client.url("/runs"), "http://localhost:8080/runs");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = DocflowClient::with_client("http://docflow:9000", Client::new());
        assert_eq!(client.base_url(), "http://docflow:9000");
    }
}
