//! # Request Logging
//!
//! One structured `http_request` event per request, emitted after the
//! response is produced.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the caller's trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Axum middleware that logs method, path, status, latency and trace id.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let trace_id = request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        trace_id = %trace_id,
        "http_request"
    );

    response
}
