//! Orchestrator configuration
//!
//! Loaded from environment variables at start-up.

use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,

    pub database_max_connections: u32,

    /// Address the HTTP API binds to
    pub bind_addr: String,

    /// Base URL of the vector index; embeddings are dropped when absent
    pub vector_index_url: Option<String>,

    pub vector_index_collection: String,

    /// Length of the vectors written by staging nodes
    pub embedding_dim: usize,

    /// Upper bound on one vector index insert
    pub vector_index_timeout: Duration,

    /// Maximum duration of a run; `None` disables the deadline
    pub run_timeout: Option<Duration>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DATABASE_URL (optional)
    /// - DATABASE_MAX_CONNECTIONS (optional, default: 10)
    /// - DOCFLOW_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - VECTOR_INDEX_URL (optional)
    /// - VECTOR_INDEX_COLLECTION (optional, default: pipeline_chunks)
    /// - VECTOR_INDEX_TIMEOUT_SECS (optional, seconds, default: 10)
    /// - EMBEDDING_DIM (optional, default: 128)
    /// - RUN_TIMEOUT_SECS (optional, seconds, default: 300, 0 disables)
    ///
    /// Numeric variables that are set but do not parse are rejected.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let database_url = non_empty_var("DATABASE_URL");

        let database_max_connections = number_var("DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(defaults.database_max_connections);

        let bind_addr = non_empty_var("DOCFLOW_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let vector_index_url = non_empty_var("VECTOR_INDEX_URL");

        let vector_index_collection =
            non_empty_var("VECTOR_INDEX_COLLECTION").unwrap_or(defaults.vector_index_collection);

        let vector_index_timeout = number_var("VECTOR_INDEX_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.vector_index_timeout);

        let embedding_dim = number_var("EMBEDDING_DIM")?.unwrap_or(defaults.embedding_dim);

        let run_timeout = number_var("RUN_TIMEOUT_SECS")?
            .map(timeout_from_secs)
            .unwrap_or(defaults.run_timeout);

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            vector_index_url,
            vector_index_collection,
            vector_index_timeout,
            embedding_dim,
            run_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.embedding_dim == 0 {
            anyhow::bail!("embedding_dim must be greater than 0");
        }

        if self.vector_index_timeout.is_zero() {
            anyhow::bail!("vector_index_timeout must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database_max_connections must be greater than 0");
        }

        if let Some(url) = &self.vector_index_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("vector_index_url must start with http:// or https://");
            }
            if self.vector_index_collection.is_empty() {
                anyhow::bail!("vector_index_collection cannot be empty");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 10,
            bind_addr: "0.0.0.0:8080".to_string(),
            vector_index_url: None,
            vector_index_collection: "pipeline_chunks".to_string(),
            vector_index_timeout: Duration::from_secs(10),
            embedding_dim: 128,
            run_timeout: Some(Duration::from_secs(300)), // 5 minutes
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn number_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_number(name, non_empty_var(name))
}

fn parse_number<T>(name: &str, raw: Option<String>) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", name, value))
    })
    .transpose()
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
