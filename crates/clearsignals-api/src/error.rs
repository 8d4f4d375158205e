use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clearsignals_memory::MemoryError;
use clearsignals_pipeline::error::{excerpt, BODY_EXCERPT_CHARS};
use clearsignals_pipeline::PipelineError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Server misconfigured: {0}")]
    Configuration(String),

    #[error("Deal memory is not configured")]
    MemoryUnavailable,

    #[error("Request timed out")]
    Timeout,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Memory(MemoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::MemoryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Memory(_) => StatusCode::BAD_GATEWAY,
            ApiError::Configuration(_) | ApiError::Pipeline(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = excerpt(&self.to_string(), BODY_EXCERPT_CHARS);

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Configuration("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::MemoryUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            ApiError::Memory(MemoryError::Decode("bad".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Pipeline(PipelineError::Configuration("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let err = ApiError::Memory(MemoryError::Index {
            status: 500,
            body: "x".repeat(2000),
        });
        let message = excerpt(&err.to_string(), BODY_EXCERPT_CHARS);
        assert_eq!(message.chars().count(), BODY_EXCERPT_CHARS);
    }
}
