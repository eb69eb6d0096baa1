//! Permissive CORS headers for browser clients.
//!
//! Attached to preflight responses and to every proxied response (including
//! proxy failures). Static files and unmatched POSTs go out without them.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str =
    "Content-Type, x-api-key, anthropic-version, anthropic-dangerous-client-side-api-keys";

/// The three CORS headers as `(name, value)` pairs.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ),
    ]
}

/// Add the CORS headers to a header map.
pub fn apply(headers: &mut HeaderMap) {
    for (name, value) in cors_headers() {
        headers.insert(name, value);
    }
}

/// 200 with CORS headers and an empty body.
pub fn preflight() -> Response {
    (StatusCode::OK, cors_headers()).into_response()
}
