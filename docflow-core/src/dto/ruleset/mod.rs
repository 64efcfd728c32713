//! Validation ruleset DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to register a validation ruleset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRuleSet {
    pub name: String,
    pub use_case: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Value,
}
