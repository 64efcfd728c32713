//! Run Repository
//!
//! Handles all database operations related to pipeline runs.
//! Lifecycle updates are guarded on the current status so a run can only
//! move `queued -> running -> {succeeded, failed}`.

use docflow_core::domain::run::{PipelineRun, RunStatus, RunSummary};
use docflow_core::dto::run::RunFilter;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::decode_tag;

const RUN_COLUMNS: &str = "id, pipeline_id, status, input_ref, result_summary, error_message, \
                           logs_location, created_at, started_at, completed_at";

/// Create a new queued run in the database
pub async fn create(
    pool: &PgPool,
    pipeline_id: Uuid,
    input_ref: Option<String>,
) -> Result<PipelineRun, sqlx::Error> {
    let run = PipelineRun {
        id: Uuid::new_v4(),
        pipeline_id,
        status: RunStatus::Queued,
        input_ref,
        result_summary: None,
        error_message: None,
        logs_location: None,
        created_at: chrono::Utc::now(),
        started_at: None,
        completed_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO pipeline_runs (id, pipeline_id, status, input_ref, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(run.id)
    .bind(run.pipeline_id)
    .bind(run.status.as_str())
    .bind(&run.input_ref)
    .bind(run.created_at)
    .execute(pool)
    .await?;

    Ok(run)
}

/// Find a run by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PipelineRun>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM pipeline_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PipelineRun::try_from).transpose()
}

/// List runs, newest first
pub async fn list(pool: &PgPool, filter: &RunFilter) -> Result<Vec<PipelineRun>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RunRow>(&format!(
        r#"
        SELECT {RUN_COLUMNS}
        FROM pipeline_runs
        WHERE ($1::UUID IS NULL OR pipeline_id = $1)
          AND ($2::VARCHAR IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#
    ))
    .bind(filter.pipeline_id)
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.limit() as i64)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PipelineRun::try_from).collect()
}

/// Move a queued run to running, stamping `started_at`
pub async fn update_status_to_running(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PipelineRun>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(&format!(
        r#"
        UPDATE pipeline_runs
        SET status = 'running', started_at = $1
        WHERE id = $2 AND status = 'queued'
        RETURNING {RUN_COLUMNS}
        "#
    ))
    .bind(chrono::Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PipelineRun::try_from).transpose()
}

/// Move a running run to succeeded with its summary, stamping `completed_at`
pub async fn update_status_to_succeeded(
    pool: &PgPool,
    id: Uuid,
    summary: &RunSummary,
) -> Result<Option<PipelineRun>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(&format!(
        r#"
        UPDATE pipeline_runs
        SET status = 'succeeded', result_summary = $1, completed_at = $2
        WHERE id = $3 AND status = 'running'
        RETURNING {RUN_COLUMNS}
        "#
    ))
    .bind(Json(summary))
    .bind(chrono::Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PipelineRun::try_from).transpose()
}

/// Move a running run to failed with its error, stamping `completed_at`
pub async fn update_status_to_failed(
    pool: &PgPool,
    id: Uuid,
    error_message: &str,
) -> Result<Option<PipelineRun>, sqlx::Error> {
    let row = sqlx::query_as::<_, RunRow>(&format!(
        r#"
        UPDATE pipeline_runs
        SET status = 'failed', error_message = $1, completed_at = $2
        WHERE id = $3 AND status = 'running'
        RETURNING {RUN_COLUMNS}
        "#
    ))
    .bind(error_message)
    .bind(chrono::Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(PipelineRun::try_from).transpose()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    pipeline_id: Uuid,
    status: String,
    input_ref: Option<String>,
    result_summary: Option<Json<RunSummary>>,
    error_message: Option<String>,
    logs_location: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<RunRow> for PipelineRun {
    type Error = sqlx::Error;

    fn try_from(row: RunRow) -> Result<Self, Self::Error> {
        Ok(PipelineRun {
            id: row.id,
            pipeline_id: row.pipeline_id,
            status: decode_tag("status", &row.status)?,
            input_ref: row.input_ref,
            result_summary: row.result_summary.map(|s| s.0),
            error_message: row.error_message,
            logs_location: row.logs_location,
            created_at: row.created_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}
