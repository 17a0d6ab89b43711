use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::LedgerError;
use crate::orchestration::ReconcileError;

/// Failures surfaced at the HTTP boundary.
///
/// Each renders as `{"message": ..., "error": ...}`; `error` carries the
/// underlying cause when there is one.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Only POST requests allowed")]
    MethodNotAllowed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Error reading upstream data: {0}")]
    UpstreamRead(String),
    #[error("Error writing upstream data: {0}")]
    UpstreamWrite(String),
    #[error("Invalid service type: {0}")]
    InvalidServiceType(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<&str>) {
        match self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Only POST requests allowed",
                None,
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::UpstreamRead(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error reading upstream data",
                Some(cause.as_str()),
            ),
            AppError::UpstreamWrite(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error writing upstream data",
                Some(cause.as_str()),
            ),
            AppError::InvalidServiceType(cause) => (
                StatusCode::BAD_REQUEST,
                "Invalid service type",
                Some(cause.as_str()),
            ),
            AppError::BadRequest(cause) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(cause.as_str()))
            }
            AppError::Internal(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(cause.as_str()),
            ),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidServiceType(_) => AppError::InvalidServiceType(err.to_string()),
            LedgerError::InvalidOrderDate(_)
            | LedgerError::Decode(_)
            | LedgerError::Overflow { .. } => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Read(e) => AppError::UpstreamRead(e.to_string()),
            ReconcileError::Write(e) => AppError::UpstreamWrite(e.to_string()),
            ReconcileError::Rejected(e) => AppError::from(e),
            ReconcileError::Replay(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, cause) = self.parts();

        let body = match cause {
            Some(cause) => json!({ "message": message, "error": cause }),
            None => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}
