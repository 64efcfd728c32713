//! Validation domain types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

/// Externally configured validation ruleset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRuleSet {
    pub id: Uuid,
    pub name: String,
    pub use_case: String,
    pub description: Option<String>,
    pub config: Value,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Outcome of validating a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Passed,
    Failed,
    NeedsReview,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Passed => "passed",
            ValidationStatus::Failed => "failed",
            ValidationStatus::NeedsReview => "needs_review",
        }
    }
}

impl FromStr for ValidationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ValidationStatus::Pending),
            "passed" => Ok(ValidationStatus::Passed),
            "failed" => Ok(ValidationStatus::Failed),
            "needs_review" => Ok(ValidationStatus::NeedsReview),
            other => Err(UnknownVariant {
                kind: "validation status",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict produced by a validation node
///
/// `thresholds` and `semantic` are forwarded from the node config for
/// downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ruleset: String,
    pub status: ValidationStatus,
    pub issues: Vec<String>,
    pub thresholds: BTreeMap<String, f64>,
    pub semantic: bool,
}
