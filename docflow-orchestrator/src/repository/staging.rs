//! Staging Repository
//!
//! Handles database operations for staged artifacts.

use docflow_core::domain::staging::StagedData;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::decode_tag;
use crate::store::NewStagedData;

/// Insert a staged artifact
pub async fn create(pool: &PgPool, new: NewStagedData) -> Result<StagedData, sqlx::Error> {
    let now = chrono::Utc::now();

    let staged = StagedData {
        id: Uuid::new_v4(),
        pipeline_run_id: new.pipeline_run_id,
        document_id: new.document_id,
        use_case: new.use_case,
        payload_type: new.payload_type,
        payload: new.payload,
        validation_status: new.validation_status,
        issues: new.issues,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO staged_data (
            id, pipeline_run_id, document_id, use_case, payload_type,
            payload, validation_status, issues, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(staged.id)
    .bind(staged.pipeline_run_id)
    .bind(staged.document_id)
    .bind(staged.use_case.as_str())
    .bind(&staged.payload_type)
    .bind(&staged.payload)
    .bind(staged.validation_status.as_str())
    .bind(Json(&staged.issues))
    .bind(staged.created_at)
    .bind(staged.updated_at)
    .execute(pool)
    .await?;

    Ok(staged)
}

/// List the artifacts staged by a run, oldest first
pub async fn find_by_run(pool: &PgPool, run_id: Uuid) -> Result<Vec<StagedData>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StagedRow>(
        r#"
        SELECT id, pipeline_run_id, document_id, use_case, payload_type,
               payload, validation_status, issues, created_at, updated_at
        FROM staged_data
        WHERE pipeline_run_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StagedData::try_from).collect()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StagedRow {
    id: Uuid,
    pipeline_run_id: Uuid,
    document_id: Option<Uuid>,
    use_case: String,
    payload_type: String,
    payload: Value,
    validation_status: String,
    issues: Json<Vec<String>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<StagedRow> for StagedData {
    type Error = sqlx::Error;

    fn try_from(row: StagedRow) -> Result<Self, Self::Error> {
        Ok(StagedData {
            id: row.id,
            pipeline_run_id: row.pipeline_run_id,
            document_id: row.document_id,
            use_case: decode_tag("use_case", &row.use_case)?,
            payload_type: row.payload_type,
            payload: row.payload,
            validation_status: decode_tag("validation_status", &row.validation_status)?,
            issues: row.issues.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
