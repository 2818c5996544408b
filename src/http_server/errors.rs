//! # API Errors
//!
//! Maps schema, lookup and storage failures onto HTTP responses.
//! Every error body has a single `detail` key.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::observability::Logger;
use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Message returned when an id does not resolve to an item
pub const NOT_FOUND_MESSAGE: &str = "Item not found";

/// Result type for item handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Item API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload, query or path failed validation
    #[error("{0}")]
    Validation(#[from] SchemaError),

    /// Referenced id has no live item
    #[error("Item not found")]
    NotFound,

    /// Persistence layer failure; details are logged, not returned
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for this error
    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(err) => json!({ "detail": err.violations() }),
            ApiError::NotFound => json!({ "detail": NOT_FOUND_MESSAGE }),
            ApiError::Storage(_) => json!({ "detail": "Internal Server Error" }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(ref err) = self {
            Logger::error(
                "STORAGE_ERROR",
                &[
                    ("code", err.code().code()),
                    ("message", err.message()),
                    ("details", err.details().unwrap_or("")),
                ],
            );
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
