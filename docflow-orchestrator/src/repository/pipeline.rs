//! Pipeline Repository
//!
//! Handles all database operations related to pipelines.

use docflow_core::domain::pipeline::{Pipeline, PipelineDefinition};
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::decode_tag;

/// Create a new pipeline in the database
pub async fn create(pool: &PgPool, req: CreatePipeline) -> Result<Pipeline, sqlx::Error> {
    let now = chrono::Utc::now();

    let pipeline = Pipeline {
        id: Uuid::new_v4(),
        name: req.name,
        description: req.description,
        use_case: req.use_case,
        definition: req.definition,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO pipelines (
            id, name, description, use_case, definition, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(pipeline.id)
    .bind(&pipeline.name)
    .bind(&pipeline.description)
    .bind(pipeline.use_case.as_str())
    .bind(Json(&pipeline.definition))
    .bind(pipeline.is_active)
    .bind(pipeline.created_at)
    .bind(pipeline.updated_at)
    .execute(pool)
    .await?;

    Ok(pipeline)
}

/// Find a pipeline by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Pipeline>, sqlx::Error> {
    let row = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT id, name, description, use_case, definition, is_active, created_at, updated_at
        FROM pipelines
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Pipeline::try_from).transpose()
}

/// List pipelines, newest first
pub async fn list(pool: &PgPool, filter: &PipelineFilter) -> Result<Vec<Pipeline>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PipelineRow>(
        r#"
        SELECT id, name, description, use_case, definition, is_active, created_at, updated_at
        FROM pipelines
        WHERE ($1::VARCHAR IS NULL OR use_case = $1)
          AND (NOT $2 OR is_active)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.use_case.map(|u| u.as_str()))
    .bind(filter.active_only())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Pipeline::try_from).collect()
}

/// Persist every mutable field of a pipeline
pub async fn save(pool: &PgPool, pipeline: &Pipeline) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE pipelines
        SET name = $1, description = $2, use_case = $3, definition = $4,
            is_active = $5, updated_at = $6
        WHERE id = $7
        "#,
    )
    .bind(&pipeline.name)
    .bind(&pipeline.description)
    .bind(pipeline.use_case.as_str())
    .bind(Json(&pipeline.definition))
    .bind(pipeline.is_active)
    .bind(pipeline.updated_at)
    .bind(pipeline.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a pipeline by ID; its runs are removed by cascade
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pipelines WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    use_case: String,
    definition: Json<PipelineDefinition>,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PipelineRow> for Pipeline {
    type Error = sqlx::Error;

    fn try_from(row: PipelineRow) -> Result<Self, Self::Error> {
        Ok(Pipeline {
            id: row.id,
            name: row.name,
            description: row.description,
            use_case: decode_tag("use_case", &row.use_case)?,
            definition: row.definition.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
