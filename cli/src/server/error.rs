use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskboard_core::BoardError;

/// Error body returned by every endpoint: `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        let status = match &err {
            BoardError::InvalidState(_) | BoardError::InvalidEstimation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BoardError::WriteDenied { .. } => StatusCode::FORBIDDEN,
            BoardError::UnknownId(_) => StatusCode::NOT_FOUND,
            BoardError::AmbiguousId(_) => StatusCode::BAD_REQUEST,
            BoardError::Io(_) | BoardError::Serialization(_) => {
                tracing::error!(error = %err, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "store task panicked");
        ApiError::internal("internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
