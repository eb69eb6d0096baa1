//! Dev server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Anthropic API base URL.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

/// Path prefix that routes a POST to the upstream API.
pub const DEFAULT_API_PREFIX: &str = "/api/anthropic";

/// Request headers copied to the upstream request.
pub const DEFAULT_FORWARD_HEADERS: &[&str] = &[
    "x-api-key",
    "anthropic-version",
    "anthropic-dangerous-client-side-api-keys",
    "content-type",
];

/// Configuration for the dev server.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,

    /// Directory served for GET/HEAD requests.
    pub static_root: PathBuf,

    /// Upstream base URL; the rewritten request path is appended to it.
    pub upstream_url: String,

    /// Path prefix marking requests to forward.
    pub api_prefix: String,

    /// Allow-list of request headers copied upstream.
    pub forward_headers: Vec<String>,

    /// Upstream request timeout. `None` waits indefinitely.
    pub upstream_timeout: Option<Duration>,

    /// Maximum inbound body size for proxied requests. `None` reads the
    /// whole body whatever its size.
    pub max_body_size: Option<usize>,

    /// Enable per-request access logging.
    pub request_logging: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_root: PathBuf::from("."),
            upstream_url: ANTHROPIC_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            forward_headers: DEFAULT_FORWARD_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            upstream_timeout: None,
            max_body_size: None,
            request_logging: true,
        }
    }
}

impl ProxyConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_static_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.static_root = root.into();
        self
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_forward_headers(mut self, headers: Vec<String>) -> Self {
        self.forward_headers = headers;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }

    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = Some(size);
        self
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Whether a request path is routed to the upstream API.
    pub fn is_api_path(&self, path: &str) -> bool {
        path.starts_with(&self.api_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_dev_server() {
        let config = ProxyConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.upstream_url, "https://api.anthropic.com");
        assert_eq!(config.api_prefix, "/api/anthropic");
        assert_eq!(config.forward_headers.len(), 4);
        assert!(config.upstream_timeout.is_none());
        assert!(config.max_body_size.is_none());
    }

    #[test]
    fn test_is_api_path() {
        let config = ProxyConfig::default();
        assert!(config.is_api_path("/api/anthropic/v1/messages"));
        assert!(config.is_api_path("/api/anthropic"));
        assert!(!config.is_api_path("/index.html"));
        assert!(!config.is_api_path("/static/api/anthropic/v1"));
    }

    #[test]
    fn test_builder() {
        let config = ProxyConfig::new("127.0.0.1:0".parse().unwrap())
            .with_upstream_url("http://localhost:9999")
            .with_upstream_timeout(Duration::from_secs(5))
            .with_request_logging(false);

        assert_eq!(config.bind_addr.port(), 0);
        assert_eq!(config.upstream_url, "http://localhost:9999");
        assert_eq!(config.upstream_timeout, Some(Duration::from_secs(5)));
        assert!(!config.request_logging);
    }
}
