//! Error to HTTP response mapping.
//!
//! Every error body is `{"code", "message"}` with a stable machine code, so
//! clients can tell "system occupied" (`CONFLICT`) from "stale session id"
//! (`UNAUTHORIZED`) without parsing prose.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use lexdrift_core::errors::DriftError;

/// Wire-format error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

/// API-level error: a [`DriftError`] plus its HTTP mapping.
#[derive(Debug)]
pub struct ApiError(pub DriftError);

impl From<DriftError> for ApiError {
    fn from(err: DriftError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DriftError::Conflict(_) | DriftError::NotReady(_) => StatusCode::CONFLICT,
            DriftError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DriftError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DriftError::NotFound(_) => StatusCode::NOT_FOUND,
            DriftError::Alignment(_) | DriftError::Training(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.0.code().to_owned(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
