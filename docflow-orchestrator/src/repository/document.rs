//! Document Repository
//!
//! Handles database operations for documents and their ingested chunks.

use docflow_core::domain::document::{Document, IngestedChunk};
use docflow_core::dto::document::CreateDocument;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_tag;

/// Register a new document
pub async fn create(
    pool: &PgPool,
    req: CreateDocument,
    pipeline_run_id: Option<Uuid>,
) -> Result<Document, sqlx::Error> {
    let document = Document {
        id: Uuid::new_v4(),
        pipeline_run_id,
        source_type: req.source_type,
        external_ref: req.external_ref,
        file_name: req.file_name,
        mime_type: req.mime_type,
        storage_uri: req.storage_uri,
        metadata: req.metadata,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO documents (
            id, pipeline_run_id, source_type, external_ref, file_name,
            mime_type, storage_uri, metadata, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(document.id)
    .bind(document.pipeline_run_id)
    .bind(document.source_type.as_str())
    .bind(&document.external_ref)
    .bind(&document.file_name)
    .bind(&document.mime_type)
    .bind(&document.storage_uri)
    .bind(&document.metadata)
    .bind(document.created_at)
    .execute(pool)
    .await?;

    Ok(document)
}

/// Find a document by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Document>, sqlx::Error> {
    let row = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, pipeline_run_id, source_type, external_ref, file_name,
               mime_type, storage_uri, metadata, created_at
        FROM documents
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Document::try_from).transpose()
}

/// Append a chunk at the next free index of the document
///
/// The document row is locked for the duration of the transaction so
/// concurrent appends to the same document take consecutive indices.
pub async fn append_chunk(
    pool: &PgPool,
    document_id: Uuid,
    content: &str,
    metadata: Option<&Value>,
) -> Result<IngestedChunk, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, ChunkRow>(
        r#"
        INSERT INTO ingested_chunks (document_id, chunk_index, content, metadata, created_at)
        SELECT $1, COALESCE(MAX(chunk_index) + 1, 0), $2, $3, $4
        FROM ingested_chunks
        WHERE document_id = $1
        RETURNING id, document_id, chunk_index, content, metadata, created_at
        "#,
    )
    .bind(document_id)
    .bind(content)
    .bind(metadata)
    .bind(chrono::Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(row.into())
}

/// List the chunks of a document in index order
pub async fn list_chunks(pool: &PgPool, document_id: Uuid) -> Result<Vec<IngestedChunk>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ChunkRow>(
        r#"
        SELECT id, document_id, chunk_index, content, metadata, created_at
        FROM ingested_chunks
        WHERE document_id = $1
        ORDER BY chunk_index ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    pipeline_run_id: Option<Uuid>,
    source_type: String,
    external_ref: Option<String>,
    file_name: Option<String>,
    mime_type: Option<String>,
    storage_uri: Option<String>,
    metadata: Option<Value>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            pipeline_run_id: row.pipeline_run_id,
            source_type: decode_tag("source_type", &row.source_type)?,
            external_ref: row.external_ref,
            file_name: row.file_name,
            mime_type: row.mime_type,
            storage_uri: row.storage_uri,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    document_id: Uuid,
    chunk_index: i32,
    content: String,
    metadata: Option<Value>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ChunkRow> for IngestedChunk {
    fn from(row: ChunkRow) -> Self {
        IngestedChunk {
            id: row.id,
            document_id: row.document_id,
            chunk_index: row.chunk_index,
            content: row.content,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}
