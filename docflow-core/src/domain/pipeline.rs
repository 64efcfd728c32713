//! Pipeline domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

/// Registered pipeline
///
/// The name is globally unique. Pipelines are soft-deleted by clearing `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub use_case: UseCase,
    pub definition: PipelineDefinition,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Business use case a pipeline serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    InvoiceProcessing,
    FoiaRequest,
    Generic,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::InvoiceProcessing => "invoice_processing",
            UseCase::FoiaRequest => "foia_request",
            UseCase::Generic => "generic",
        }
    }
}

impl FromStr for UseCase {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice_processing" => Ok(UseCase::InvoiceProcessing),
            "foia_request" => Ok(UseCase::FoiaRequest),
            "generic" => Ok(UseCase::Generic),
            other => Err(UnknownVariant {
                kind: "use case",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative pipeline body
///
/// Nodes execute strictly in declaration order. Edges and metadata are stored
/// and returned as-is but never consulted during execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// One configured step of a pipeline
///
/// The `type` tag is kept as free text so definitions written for newer or
/// older engines still load; unrecognized tags are skipped at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default = "empty_config")]
    pub config: Value,
}

impl NodeSpec {
    pub fn new(node_type: impl Into<String>, config: Value) -> Self {
        Self {
            node_type: node_type.into(),
            config,
        }
    }
}

fn empty_config() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_defaults_missing_sections() {
        let def: PipelineDefinition = serde_json::from_value(json!({
            "nodes": [{ "type": "LLMProcessingNode" }]
        }))
        .unwrap();

        assert_eq!(def.nodes.len(), 1);
        assert_eq!(def.nodes[0].node_type, "LLMProcessingNode");
        assert_eq!(def.nodes[0].config, json!({}));
        assert!(def.edges.is_empty());
        assert!(def.metadata.is_empty());
    }

    #[test]
    fn test_node_without_type_loads_as_empty_tag() {
        let node: NodeSpec = serde_json::from_value(json!({ "config": { "mode": "x" } })).unwrap();
        assert_eq!(node.node_type, "");
    }

    #[test]
    fn test_use_case_parsing() {
        assert_eq!("foia_request".parse::<UseCase>(), Ok(UseCase::FoiaRequest));
        assert!("payroll".parse::<UseCase>().is_err());
        assert_eq!(
            serde_json::to_value(UseCase::InvoiceProcessing).unwrap(),
            json!("invoice_processing")
        );
    }
}
