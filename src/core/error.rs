//! Error type system for Librarian
//!
//! A small closed set of tagged error variants mapped once at the HTTP
//! boundary to status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the Librarian service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // Client-input errors
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Store(_) | ServiceError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "ValidationError",
            ServiceError::NotFound(_) => "NotFoundError",
            ServiceError::Database(_) | ServiceError::Store(_) => "StoreError",
            ServiceError::Io(_) => "IoError",
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique id for correlating this error with server logs
    pub request_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated request id
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a ServiceError
    pub fn from_error(error: &ServiceError) -> Self {
        Self::new(error.error_type().to_string(), error.to_string())
    }
}

/// Implement IntoResponse for ServiceError to enable automatic error handling in Axum
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        tracing::error!(
            error_type = self.error_type(),
            request_id = %error_response.request_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with ServiceError
pub type Result<T> = std::result::Result<T, ServiceError>;
