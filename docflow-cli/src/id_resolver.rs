//! ID resolver module
//!
//! Lets users pass a short, unambiguous UUID prefix instead of a full ID.
//! Prefixes are resolved against the matching list endpoint.

use anyhow::{Context, Result, anyhow};
use docflow_client::DocflowClient;
use docflow_core::dto::pipeline::PipelineFilter;
use docflow_core::dto::run::{MAX_RUN_LIST_LIMIT, RunFilter};
use uuid::Uuid;

/// Identifier that is either a full UUID or a prefix of one
#[derive(Debug, Clone, PartialEq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.to_lowercase()),
        }
    }
}

/// Resolve a pipeline ID or prefix, inactive pipelines included
pub async fn resolve_pipeline_id(client: &DocflowClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let filter = PipelineFilter {
        active_only: Some(false),
        ..Default::default()
    };
    let pipelines = client
        .list_pipelines(&filter)
        .await
        .context("Failed to fetch pipelines for ID resolution")?;

    match_prefix("pipeline", &prefix, pipelines.iter().map(|p| p.id))
}

/// Resolve a run ID or prefix among the most recent runs
pub async fn resolve_run_id(client: &DocflowClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let filter = RunFilter {
        limit: Some(MAX_RUN_LIST_LIMIT),
        ..Default::default()
    };
    let runs = client
        .list_runs(&filter)
        .await
        .context("Failed to fetch runs for ID resolution")?;

    match_prefix("run", &prefix, runs.iter().map(|r| r.id))
}

fn match_prefix(kind: &str, prefix: &str, ids: impl Iterator<Item = Uuid>) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No {} found with ID starting with '{}'", kind, prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: &str = "3f1c2a9e-0000-4000-8000-000000000001";
    const SECOND: &str = "3f1d7b10-0000-4000-8000-000000000002";

    fn ids() -> Vec<Uuid> {
        vec![
            Uuid::parse_str(FIRST).unwrap(),
            Uuid::parse_str(SECOND).unwrap(),
        ]
    }

    #[test]
    fn test_parse_full_and_prefix() {
        assert_eq!(
            IdOrPrefix::parse(FIRST),
            IdOrPrefix::Full(Uuid::parse_str(FIRST).unwrap())
        );
        assert_eq!(
            IdOrPrefix::parse("3F1C"),
            IdOrPrefix::Prefix("3f1c".to_string())
        );
    }

    #[test]
    fn test_unique_prefix_resolves() {
        let id = match_prefix("run", "3f1c", ids().into_iter()).unwrap();
        assert_eq!(id.to_string(), FIRST);
    }

    #[test]
    fn test_ambiguous_prefix_lists_candidates() {
        let err = match_prefix("run", "3f1", ids().into_iter()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Ambiguous"));
        assert!(message.contains(FIRST));
        assert!(message.contains(SECOND));
    }

    #[test]
    fn test_unknown_prefix() {
        let err = match_prefix("pipeline", "ffff", ids().into_iter()).unwrap_err();
        assert!(err.to_string().contains("No pipeline found"));
    }
}
