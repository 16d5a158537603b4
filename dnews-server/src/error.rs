use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid topic '{topic}'; expected one of: {expected}")]
    InvalidTopic { topic: String, expected: String },
    /// `limit` is the only query field that can fail to parse.
    #[error("Invalid limit; expected a non-negative integer ({reason})")]
    InvalidLimit { reason: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTopic { .. } | ApiError::InvalidLimit { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
