//! Error types for the order cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure reported by the durable store behind the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached (connection refused, timeout, ...)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with an unexpected failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

// == Cache Error Enum ==
/// Unified error type for the order cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent from both the cache and the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Store call failed; in-memory state was left untouched
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Store failed while populating the cache at startup
    #[error("Warm-up failed: {0}")]
    WarmUp(StoreError),

    /// Invalid request data or ingestion payload
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal invariant breach
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(_) => (StatusCode::NOT_FOUND, "order not found".to_string()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::Store(_) | CacheError::WarmUp(_) | CacheError::Internal(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the order cache.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type returned by store implementations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
