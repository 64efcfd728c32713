//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::document::DocumentError;
use crate::service::pipeline::PipelineError;
use crate::service::ruleset::RuleSetError;
use crate::service::run::RunError;
use crate::store::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    StoreError(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::StoreError(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                StoreError::Conflict(_) | StoreError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                StoreError::MissingReference(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                StoreError::Database(err) => {
                    tracing::error!("Database error: {:?}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotFound(id) => ApiError::NotFound(format!("Pipeline {} not found", id)),
            PipelineError::ValidationError(msg) => ApiError::BadRequest(msg),
            PipelineError::Conflict(msg) => ApiError::Conflict(msg),
            PipelineError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::InvalidInput | RunError::PipelineInactive(_) => {
                ApiError::BadRequest(err.to_string())
            }
            RunError::PipelineNotFound(id) => {
                ApiError::NotFound(format!("Pipeline {} not found", id))
            }
            RunError::NotFound(id) => ApiError::NotFound(format!("Run {} not found", id)),
            RunError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(id) => ApiError::NotFound(format!("Document {} not found", id)),
            DocumentError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<RuleSetError> for ApiError {
    fn from(err: RuleSetError) -> Self {
        match err {
            RuleSetError::ValidationError(msg) => ApiError::BadRequest(msg),
            RuleSetError::Conflict(msg) => ApiError::Conflict(msg),
            RuleSetError::Store(err) => ApiError::StoreError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
