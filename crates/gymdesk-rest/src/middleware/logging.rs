//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use gymdesk_security::Principal;
use std::time::Instant;
use tracing::{info, warn};

/// Header carrying the request id set by `SetRequestIdLayer`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs one line per request once the response is ready.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    let subject = response
        .extensions()
        .get::<Principal>()
        .map_or_else(|| "anonymous".to_string(), |p| p.user_id.to_string());

    if response.status().is_server_error() {
        warn!(
            target: "http",
            method = %method,
            uri = %uri,
            status,
            duration_ms = %duration_ms,
            request_id = %request_id,
            subject = %subject,
            "HTTP request failed"
        );
    } else {
        info!(
            target: "http",
            method = %method,
            uri = %uri,
            status,
            duration_ms = %duration_ms,
            request_id = %request_id,
            subject = %subject,
            "HTTP request completed"
        );
    }

    response
}
