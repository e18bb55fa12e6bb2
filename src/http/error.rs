//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::LifecycleError;
use crate::store::StoreError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Actor header missing or not a known user
    Unauthenticated(String),
    /// Actor known but lacks the required role
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Request conflicts with current state (terminal request, missing
    /// draft, generation already in flight)
    Conflict(String),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHENTICATED", msg))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::NoDraft => AppError::Conflict(err.to_string()),
            StoreError::SnapshotLoad(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Unauthorized { .. } => AppError::Forbidden(err.to_string()),
            LifecycleError::RequestNotFound(_) | LifecycleError::EntryNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            LifecycleError::AlreadyResolved(_) | LifecycleError::NoPublishedTimetable => {
                AppError::Conflict(err.to_string())
            }
            LifecycleError::Invalid(msg) => AppError::BadRequest(msg),
            LifecycleError::Store(store) => store.into(),
        }
    }
}
