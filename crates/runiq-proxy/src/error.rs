//! Error types for the dev server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::cors;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors that can occur while proxying a request.
///
/// Upstream HTTP error statuses are not errors; they are relayed as-is.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream request could not be completed.
    #[error("{0}")]
    Upstream(String),

    /// The inbound request body could not be read.
    #[error("{0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Upstream(e.to_string())
    }
}

/// Every proxy failure is a 500 carrying `{"error": "<message>"}` and the
/// CORS headers, so the browser can read it.
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            cors::cors_headers(),
            Json(body),
        )
            .into_response()
    }
}
