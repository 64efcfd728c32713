//! Validation Ruleset Repository

use docflow_core::domain::validation::ValidationRuleSet;
use docflow_core::dto::ruleset::CreateRuleSet;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Register a new ruleset
pub async fn create(pool: &PgPool, req: CreateRuleSet) -> Result<ValidationRuleSet, sqlx::Error> {
    let ruleset = ValidationRuleSet {
        id: Uuid::new_v4(),
        name: req.name,
        use_case: req.use_case,
        description: req.description,
        config: req.config,
        is_active: true,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO validation_rulesets (id, name, use_case, description, config, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(ruleset.id)
    .bind(&ruleset.name)
    .bind(&ruleset.use_case)
    .bind(&ruleset.description)
    .bind(&ruleset.config)
    .bind(ruleset.is_active)
    .bind(ruleset.created_at)
    .execute(pool)
    .await?;

    Ok(ruleset)
}

/// Find a ruleset by its unique name
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<ValidationRuleSet>, sqlx::Error> {
    let row = sqlx::query_as::<_, RuleSetRow>(
        r#"
        SELECT id, name, use_case, description, config, is_active, created_at
        FROM validation_rulesets
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all rulesets by name
pub async fn list_all(pool: &PgPool) -> Result<Vec<ValidationRuleSet>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RuleSetRow>(
        r#"
        SELECT id, name, use_case, description, config, is_active, created_at
        FROM validation_rulesets
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

#[derive(sqlx::FromRow)]
struct RuleSetRow {
    id: Uuid,
    name: String,
    use_case: String,
    description: Option<String>,
    config: Value,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RuleSetRow> for ValidationRuleSet {
    fn from(row: RuleSetRow) -> Self {
        ValidationRuleSet {
            id: row.id,
            name: row.name,
            use_case: row.use_case,
            description: row.description,
            config: row.config,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}
