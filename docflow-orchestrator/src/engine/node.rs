//! Node kinds
//!
//! A pipeline definition stores nodes as `{type, config}` pairs. Before
//! dispatch each pair is resolved into a [`Node`], a closed set of kinds with
//! typed configs, so the orchestrator matches exhaustively on it.

use docflow_core::domain::document::SourceType;
use docflow_core::domain::pipeline::NodeSpec;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::{EngineError, EngineResult};

pub const INGESTION_NODE: &str = "DocumentIngestionNode";
pub const LLM_PROCESSING_NODE: &str = "LLMProcessingNode";
pub const VALIDATION_NODE: &str = "ValidationNode";
pub const STAGING_NODE: &str = "StagingNode";

/// A resolved pipeline node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Ingestion(IngestionConfig),
    LlmProcessing(LlmConfig),
    Validation(ValidationConfig),
    Staging(StagingConfig),
}

impl Node {
    /// Resolves a stored node
    ///
    /// Returns `Ok(None)` for node types this engine does not know, which the
    /// orchestrator skips. A known type with a malformed config is an error.
    pub fn from_spec(spec: &NodeSpec) -> EngineResult<Option<Self>> {
        let node = match spec.node_type.as_str() {
            INGESTION_NODE => Node::Ingestion(parse_config(INGESTION_NODE, &spec.config)?),
            LLM_PROCESSING_NODE => {
                Node::LlmProcessing(parse_config(LLM_PROCESSING_NODE, &spec.config)?)
            }
            VALIDATION_NODE => Node::Validation(parse_config(VALIDATION_NODE, &spec.config)?),
            STAGING_NODE => Node::Staging(parse_config(STAGING_NODE, &spec.config)?),
            _ => return Ok(None),
        };
        Ok(Some(node))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Ingestion(_) => INGESTION_NODE,
            Node::LlmProcessing(_) => LLM_PROCESSING_NODE,
            Node::Validation(_) => VALIDATION_NODE,
            Node::Staging(_) => STAGING_NODE,
        }
    }
}

fn parse_config<T: DeserializeOwned + Default>(
    node_type: &'static str,
    config: &Value,
) -> EngineResult<T> {
    if config.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(config.clone())
        .map_err(|source| EngineError::InvalidConfig { node_type, source })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub source_type: SourceType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `summarize` or `classify`; anything else summarizes
    pub mode: String,
    pub model_name: String,
    pub prompt_template_id: String,
    pub output_schema_id: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: "summarize".to_string(),
            model_name: "gpt-mini".to_string(),
            prompt_template_id: "default".to_string(),
            output_schema_id: "generic".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub ruleset_name: String,
    pub use_semantic_lookup: bool,
    pub thresholds: BTreeMap<String, f64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ruleset_name: "default".to_string(),
            use_semantic_lookup: false,
            thresholds: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    pub payload_type: String,
    pub write_embeddings: bool,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            payload_type: "generic_structured_output".to_string(),
            write_embeddings: false,
        }
    }
}
