//! Validation Ruleset Service

use docflow_core::domain::validation::ValidationRuleSet;
use docflow_core::dto::ruleset::CreateRuleSet;
use thiserror::Error;

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RuleSetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => RuleSetError::Conflict(msg),
            other => RuleSetError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleSetError>;

/// Register a ruleset
pub async fn create_ruleset(
    store: &dyn RecordStore,
    req: CreateRuleSet,
) -> Result<ValidationRuleSet> {
    if req.name.trim().is_empty() {
        return Err(RuleSetError::ValidationError(
            "Ruleset name cannot be empty".to_string(),
        ));
    }
    if !req.config.is_object() && !req.config.is_null() {
        return Err(RuleSetError::ValidationError(
            "Ruleset config must be a JSON object".to_string(),
        ));
    }

    let ruleset = store.create_ruleset(req).await?;

    tracing::info!("Ruleset registered: {} ({})", ruleset.name, ruleset.id);

    Ok(ruleset)
}

/// List all rulesets
pub async fn list_rulesets(store: &dyn RecordStore) -> Result<Vec<ValidationRuleSet>> {
    Ok(store.list_rulesets().await?)
}
