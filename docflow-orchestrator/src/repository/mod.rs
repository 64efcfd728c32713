//! Repository Module
//!
//! Postgres data access layer for the orchestrator.
//! Each repository handles database operations for a specific domain entity.

use std::str::FromStr;

pub mod document;
pub mod pipeline;
pub mod ruleset;
pub mod run;
pub mod staging;

// Re-export for convenience
pub use document as document_repository;
pub use pipeline as pipeline_repository;
pub use ruleset as ruleset_repository;
pub use run as run_repository;
pub use staging as staging_repository;

/// Decode a VARCHAR tag column into its domain enum
fn decode_tag<T>(column: &str, value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
