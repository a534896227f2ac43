//! Error types for the floor server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bistro_engine::EngineError;
use serde::Serialize;

/// JSON error body: `{"code": "NOT_FOUND", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &'static str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";

    pub fn new(code: &str, message: impl Into<String>) -> Self {
        ApiError {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Self::VALIDATION_ERROR, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            Self::NOT_FOUND => StatusCode::NOT_FOUND,
            Self::VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        if error.is_not_found() {
            ApiError::not_found(error.to_string())
        } else if error.is_validation() {
            ApiError::validation(error.to_string())
        } else {
            ApiError::internal(error.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            tracing::debug!(code = %self.code, message = %self.message, "Request rejected");
        }
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_status() {
        let cases = [
            (EngineError::TableNotFound("9".into()), StatusCode::NOT_FOUND),
            (EngineError::OrderNotFound("ord-x".into()), StatusCode::NOT_FOUND),
            (EngineError::ProductNotFound("p9".into()), StatusCode::NOT_FOUND),
            (EngineError::InvalidConfig("port".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (engine, status) in cases {
            assert_eq!(ApiError::from(engine).status(), status);
        }

        let validation = EngineError::Validation(bistro_core::ValidationError::NonZero {
            field: "delta".into(),
        });
        let api = ApiError::from(validation);
        assert_eq!(api.code, "VALIDATION_ERROR");
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    }
}
