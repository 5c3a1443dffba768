//! API error handling
//!
//! Every failure is rendered as `{"code": 0, "message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ocs_core::OcsError;
use serde::{Deserialize, Serialize};

/// Failure response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always 0
    pub code: i32,
    /// Human-readable message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request could not be decoded
    BadRequest(String),
    /// Validation or upstream failure while answering a query
    Query(OcsError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Query(OcsError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Query(OcsError::UpstreamStatus { status, .. }) => {
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::Query(err) => err.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<OcsError> for AppError {
    fn from(err: OcsError) -> Self {
        AppError::Query(err)
    }
}
