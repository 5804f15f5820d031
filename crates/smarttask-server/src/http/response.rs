// SPDX-License-Identifier: MIT OR Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use smarttask_api::ApiError;
use tracing::error;

/// Single place where an `ApiError` becomes an HTTP response, so the
/// `{"error": ...}` envelope and status mapping cannot drift per handler.
#[must_use]
pub(crate) fn error_response(err: &ApiError) -> Response {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.body())).into_response()
}

/// Logs the fault with full detail and answers with the opaque 500 body.
#[must_use]
pub(crate) fn internal_error(operation: &str, err: &dyn std::error::Error) -> Response {
    error!(operation, error = %err, "request failed");
    error_response(&ApiError::internal())
}
