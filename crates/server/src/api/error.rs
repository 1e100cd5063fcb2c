//! Mapping from core errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subhound_core::{ErrorKind, FingerprintError, PlanError, SearchError};
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error ready to be returned from a handler as `{ "error": "..." }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn from_kind(kind: ErrorKind, not_found: bool, message: String) -> Self {
        let status = match kind {
            ErrorKind::Io if not_found => StatusCode::NOT_FOUND,
            ErrorKind::Io => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Backend => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, message)
    }
}

impl From<FingerprintError> for ApiError {
    fn from(e: FingerprintError) -> Self {
        Self::from_kind(e.kind(), e.is_not_found(), e.to_string())
    }
}

impl From<PlanError> for ApiError {
    fn from(e: PlanError) -> Self {
        SearchError::from(e).into()
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        Self::from_kind(e.kind(), e.is_not_found(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Request rejected");
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Run filesystem-bound work off the async runtime.
pub(crate) async fn run_blocking<T, E, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("Blocking task failed: {}", e)))?
        .map_err(Into::into)
}
