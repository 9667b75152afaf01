//! HTTP error mapping (§7, §10.3).
//!
//! `HttpError` wraps [`CoreError`] (and, through it, [`EngineError`]), converting the
//! §6.4 status-code taxonomy into the JSON error envelope shape HTTP clients receive
//! and an HTTP status class (`is_client_error()` → 400, otherwise 500).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serving_core::CoreError;
use serving_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    Auth(String),
}

impl From<EngineError> for HttpError {
    fn from(err: EngineError) -> Self {
        Self::Core(CoreError::from(err))
    }
}

/// `{task_id, result, status, message}` (§7 propagation rule).
#[derive(Serialize)]
struct ErrorBody {
    task_id: String,
    result: String,
    status: u32,
    message: String,
}

impl HttpError {
    /// The §6.4 wire status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u32 {
        match self {
            Self::Core(err) => err.status_code(),
            Self::Auth(_) => serving_core::status::AUTHENTICATION_FAILED,
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Core(err) => err.is_client_error(),
            Self::Auth(_) => true,
        }
    }

    /// Human-readable message for a `TaskFailed` frame's `status_text` (§4.3/§4.4).
    #[must_use]
    pub fn status_text(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        error_response(&serving_core::TaskId::new(), &self)
    }
}

/// Builds the `{task_id, result, status, message}` JSON error response (§7), echoing a
/// known `task_id` rather than generating a fresh one.
#[must_use]
pub fn error_response(task_id: &serving_core::TaskId, err: &HttpError) -> Response {
    let http_status =
        if err.is_client_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
    let body = ErrorBody {
        task_id: task_id.to_string(),
        result: String::new(),
        status: err.status_code(),
        message: err.to_string(),
    };
    (http_status, axum::Json(body)).into_response()
}
