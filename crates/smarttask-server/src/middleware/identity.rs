// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution. The external identity provider validates the session
//! and injects the resolved user id into a trusted header before the request
//! reaches this process; this middleware turns that header into a typed
//! request-context value. Handlers only ever see [`Identity`] — the owner id
//! is never read from the body or query string.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use smarttask_api::ApiError;
use smarttask_model::OwnerId;
use tracing::warn;

use crate::http::response::error_response;
use crate::AppState;

/// The caller's resolved identity, installed as a request extension.
#[derive(Debug, Clone)]
pub struct Identity {
    pub owner: OwnerId,
}

pub(crate) async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = request
        .headers()
        .get(state.api.identity_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(OwnerId::new);

    match resolved {
        Some(Ok(owner)) => {
            request.extensions_mut().insert(Identity { owner });
            next.run(request).await
        }
        _ => {
            warn!(route = request.uri().path(), "request without resolved identity");
            error_response(&ApiError::unauthorized())
        }
    }
}
