//! Document API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use docflow_core::domain::document::Document;
use docflow_core::dto::document::{CreateDocument, DocumentDetails};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::document_service;

/// POST /documents
/// Register a document
pub async fn register_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocument>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    tracing::info!("Registering document: {}", req.source_type);

    let document = document_service::register_document(state.store.as_ref(), req).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents/{id}
/// Get a document with its chunks
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DocumentDetails>> {
    tracing::debug!("Getting document: {}", id);

    let details = document_service::get_document(state.store.as_ref(), id).await?;

    Ok(Json(details))
}
