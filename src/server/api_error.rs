//! JSON error responses.

use crate::matching::MatchingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

/// An error reported to the client as `{ "error": <code>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        error!("Store error: {:#}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            "The component catalog could not be read",
        )
    }
}

impl From<MatchingError> for ApiError {
    fn from(err: MatchingError) -> Self {
        let err = match err {
            MatchingError::Store(inner) => return ApiError::internal(inner),
            other => other,
        };
        let status = match &err {
            MatchingError::ComponentNotFound { .. } => StatusCode::NOT_FOUND,
            MatchingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}
