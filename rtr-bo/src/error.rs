//! HTTP error mapping
//!
//! Caller-facing failures keep their message. Internal faults are logged and
//! answered with an opaque 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No caller identity supplied by the gateway (401)
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Lifecycle precondition violated (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// DSP without a payload mapping (422)
    #[error("Unsupported DSP: {0}")]
    UnsupportedDsp(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<rtr_common::Error> for ApiError {
    fn from(err: rtr_common::Error) -> Self {
        use rtr_common::Error;
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidOperation(msg) => ApiError::Conflict(msg),
            Error::UnsupportedDsp(dsp) => ApiError::UnsupportedDsp(dsp),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "INVALID_OPERATION", msg),
            ApiError::UnsupportedDsp(dsp) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNSUPPORTED_DSP",
                format!("Unsupported DSP: {}", dsp),
            ),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_map_to_status() {
        let cases = [
            (rtr_common::Error::Validation("x".into()), StatusCode::BAD_REQUEST),
            (rtr_common::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (rtr_common::Error::InvalidOperation("x".into()), StatusCode::CONFLICT),
            (rtr_common::Error::UnsupportedDsp("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (rtr_common::Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (rtr_common::Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_internal_detail_kept_for_logging() {
        let err = ApiError::from(rtr_common::Error::Internal("secret path /var/db".into()));
        match &err {
            ApiError::Internal(detail) => assert!(detail.contains("secret")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
