//! Error responses shared by every route.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

/// A failed request: status plus error body.
pub type ApiFailure = (StatusCode, Json<ApiError>);

/// Result type of route handlers.
pub type ApiResult<T> = Result<T, ApiFailure>;

impl ApiError {
    /// Builds a failure response.
    pub fn response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiFailure {
        (
            status,
            Json(Self {
                error: error.to_string(),
                message: message.into(),
            }),
        )
    }

    /// 400 with the given error type.
    pub fn bad_request(error: &str, message: impl Into<String>) -> ApiFailure {
        Self::response(StatusCode::BAD_REQUEST, error, message)
    }

    /// 404 `not_found`.
    pub fn not_found(message: impl Into<String>) -> ApiFailure {
        Self::response(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 500 `lock_error`, for a poisoned state lock.
    pub fn lock() -> ApiFailure {
        Self::response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "lock_error",
            "Failed to acquire lock on telemetry state",
        )
    }

    /// 500 `serialization_error`.
    pub fn serialization(err: &serde_json::Error) -> ApiFailure {
        Self::response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "serialization_error",
            err.to_string(),
        )
    }
}

/// Serializes a borrowed view while the state lock is still held.
pub fn to_json<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::serialization(&e))
}
