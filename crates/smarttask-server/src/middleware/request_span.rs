// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::Ordering;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::AppState;

/// Wraps every request in a span carrying a request id. An id supplied by
/// the caller via `x-request-id` is propagated; otherwise one is minted from
/// the process-local seed. The id is echoed back on the response.
pub(crate) async fn request_span_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= 64)
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            format!(
                "req-{:08x}",
                state.request_id_seed.fetch_add(1, Ordering::Relaxed)
            )
        });

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let mut response = async {
        tracing::info!("request received");
        let response = next.run(request).await;
        tracing::info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
