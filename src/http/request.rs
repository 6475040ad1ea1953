//! Request identification.
//!
//! Every request carries an `x-request-id` (generated as UUID v4 when the
//! client sent none); it is echoed on the response and recorded on the
//! request span so every log line of a request can be correlated.

use axum::body::Body;
use axum::http::{HeaderName, Request};
use tracing::Span;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Span for one HTTP request, tagged with its request id.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
