//! Validation evaluator
//!
//! Rulesets are looked up by name in a [`RulesetRegistry`]. Only the built-in
//! `default` rule exists today; stored [`ValidationRuleSet`] records carry a
//! `config` blob that is handed to the rule at evaluation time.

use docflow_core::domain::run::LlmOutput;
use docflow_core::domain::validation::{ValidationReport, ValidationRuleSet, ValidationStatus};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::context::{ExecutionContext, NodeOutput};
use super::error::EngineResult;
use super::node::ValidationConfig;
use crate::store::RecordStore;

pub const DEFAULT_RULESET: &str = "default";
pub const EMPTY_RESULT_ISSUE: &str = "empty_result";

/// Everything a rule may inspect
pub struct RuleInput<'a> {
    pub llm_output: Option<&'a LlmOutput>,
    pub thresholds: &'a BTreeMap<String, f64>,
    pub semantic: bool,
    /// Config blob of the stored ruleset, `Null` when none is registered
    pub config: &'a Value,
}

/// A named validation rule
pub trait Ruleset: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the issues found; an empty list means the payload passed
    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<String>;
}

/// Result text must be present and non-empty
pub struct NonEmptyResult;

impl Ruleset for NonEmptyResult {
    fn name(&self) -> &'static str {
        DEFAULT_RULESET
    }

    fn evaluate(&self, input: &RuleInput<'_>) -> Vec<String> {
        match input.llm_output {
            Some(output) if !output.result.is_empty() => Vec::new(),
            _ => vec![EMPTY_RESULT_ISSUE.to_string()],
        }
    }
}

pub struct RulesetRegistry {
    rulesets: Vec<Arc<dyn Ruleset>>,
}

impl RulesetRegistry {
    /// Creates a registry without any rules
    pub fn empty() -> Self {
        Self {
            rulesets: Vec::new(),
        }
    }

    /// Creates a registry holding the built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(NonEmptyResult);
        registry
    }

    /// Registers a ruleset
    ///
    /// # Panics
    /// Panics if a ruleset with the same name is already registered
    pub fn register<R: Ruleset + 'static>(&mut self, ruleset: R) {
        let name = ruleset.name();
        if self.get(name).is_some() {
            panic!("Ruleset '{}' is already registered", name);
        }
        self.rulesets.push(Arc::new(ruleset));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Ruleset>> {
        self.rulesets.iter().find(|r| r.name() == name).cloned()
    }

    /// Evaluates the current LLM output against the named ruleset
    ///
    /// Names without a registered rule use the `default` rule. `stored` is
    /// the persisted ruleset of the same name, if any.
    pub fn evaluate(
        &self,
        config: &ValidationConfig,
        stored: Option<&ValidationRuleSet>,
        llm_output: Option<&LlmOutput>,
    ) -> ValidationReport {
        let rule = match self.get(&config.ruleset_name) {
            Some(rule) => Some(rule),
            None => {
                if stored.is_none() {
                    warn!(
                        ruleset = %config.ruleset_name,
                        "Unknown ruleset, falling back to default"
                    );
                }
                self.get(DEFAULT_RULESET)
            }
        };

        let rule_config = stored.map(|r| &r.config).unwrap_or(&Value::Null);
        let issues = rule
            .map(|rule| {
                rule.evaluate(&RuleInput {
                    llm_output,
                    thresholds: &config.thresholds,
                    semantic: config.use_semantic_lookup,
                    config: rule_config,
                })
            })
            .unwrap_or_default();

        let status = if issues.is_empty() {
            ValidationStatus::Passed
        } else {
            ValidationStatus::NeedsReview
        };

        ValidationReport {
            ruleset: config.ruleset_name.clone(),
            status,
            issues,
            thresholds: config.thresholds.clone(),
            semantic: config.use_semantic_lookup,
        }
    }
}

impl Default for RulesetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation node: checks the latest LLM output
pub async fn validate(
    store: &dyn RecordStore,
    registry: &RulesetRegistry,
    config: &ValidationConfig,
    ctx: &ExecutionContext,
) -> EngineResult<NodeOutput> {
    let stored = store
        .find_ruleset(&config.ruleset_name)
        .await?
        .filter(|r| r.is_active);

    let report = registry.evaluate(config, stored.as_ref(), ctx.llm_output.as_ref());
    Ok(NodeOutput::Validated(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn llm(result: &str) -> LlmOutput {
        LlmOutput {
            mode: "summarize".to_string(),
            model_name: "gpt-mini".to_string(),
            prompt_template_id: "default".to_string(),
            output_schema_id: "generic".to_string(),
            result: result.to_string(),
        }
    }

    #[test]
    fn test_empty_result_needs_review() {
        let registry = RulesetRegistry::new();
        let report = registry.evaluate(&ValidationConfig::default(), None, Some(&llm("")));

        assert_eq!(report.status, ValidationStatus::NeedsReview);
        assert_eq!(report.issues, vec![EMPTY_RESULT_ISSUE]);
    }

    #[test]
    fn test_missing_output_needs_review() {
        let registry = RulesetRegistry::new();
        let report = registry.evaluate(&ValidationConfig::default(), None, None);
        assert_eq!(report.status, ValidationStatus::NeedsReview);
    }

    #[test]
    fn test_non_empty_result_passes_and_forwards_config() {
        let registry = RulesetRegistry::new();
        let config = ValidationConfig {
            ruleset_name: "invoice_totals".to_string(),
            use_semantic_lookup: true,
            thresholds: BTreeMap::from([("confidence".to_string(), 0.8)]),
        };

        let report = registry.evaluate(&config, None, Some(&llm("total: 42")));
        assert_eq!(report.status, ValidationStatus::Passed);
        assert!(report.issues.is_empty());
        assert_eq!(report.ruleset, "invoice_totals");
        assert!(report.semantic);
        assert_eq!(report.thresholds.get("confidence"), Some(&0.8));
    }

    struct RecordingRule {
        seen: Mutex<Vec<Value>>,
    }

    impl Ruleset for Arc<RecordingRule> {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn evaluate(&self, input: &RuleInput<'_>) -> Vec<String> {
            self.seen.lock().unwrap().push(input.config.clone());
            vec!["flagged".to_string()]
        }
    }

    #[test]
    fn test_registered_rule_receives_stored_config() {
        let rule = Arc::new(RecordingRule {
            seen: Mutex::new(Vec::new()),
        });
        let mut registry = RulesetRegistry::new();
        registry.register(rule.clone());

        let stored = ValidationRuleSet {
            id: Uuid::new_v4(),
            name: "recording".to_string(),
            use_case: "generic".to_string(),
            description: None,
            config: json!({"max_amount": 1000}),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        let config = ValidationConfig {
            ruleset_name: "recording".to_string(),
            ..Default::default()
        };

        let report = registry.evaluate(&config, Some(&stored), Some(&llm("ok")));
        assert_eq!(report.status, ValidationStatus::NeedsReview);
        assert_eq!(report.issues, vec!["flagged"]);
        assert_eq!(*rule.seen.lock().unwrap(), vec![json!({"max_amount": 1000})]);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = RulesetRegistry::new();
        assert!(registry.get(DEFAULT_RULESET).is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration() {
        let mut registry = RulesetRegistry::new();
        registry.register(NonEmptyResult);
    }
}
