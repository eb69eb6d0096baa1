//! Forwarding client for proxied API requests.
//!
//! Rewrites the inbound path onto the upstream base URL, copies only the
//! allow-listed headers, and sends the body through untouched. The upstream
//! status and body come back verbatim, error statuses included.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use reqwest::Client;

use crate::config::ProxyConfig;
use crate::cors;
use crate::error::{ProxyError, Result};

/// Status and body received from the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Relayed to the browser with the upstream status and body, CORS headers,
/// and a forced JSON content type.
impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        cors::apply(headers);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        response
    }
}

/// Client that forwards API requests to the upstream host.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    upstream_url: String,
    api_prefix: String,
    forward_headers: Vec<HeaderName>,
    timeout: Option<Duration>,
}

impl Forwarder {
    /// Build a forwarder from the server config.
    ///
    /// Fails if an allow-listed header name is not a valid HTTP header name.
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let forward_headers = config
            .forward_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
                    ProxyError::Config(format!("Invalid forward header '{}': {}", name, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client: Client::new(),
            upstream_url: config.upstream_url.trim_end_matches('/').to_string(),
            api_prefix: config.api_prefix.clone(),
            forward_headers,
            timeout: config.upstream_timeout,
        })
    }

    /// Upstream URL for an inbound path (query string included).
    ///
    /// Removes the first occurrence of the API prefix. Requests only reach
    /// here when the path starts with the prefix, so that occurrence is the
    /// leading one.
    pub fn target_url(&self, path_and_query: &str) -> String {
        let rest = path_and_query.replacen(&self.api_prefix, "", 1);
        format!("{}{}", self.upstream_url, rest)
    }

    /// Copy the allow-listed headers that are present and non-empty.
    pub fn forwarded_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut outbound = HeaderMap::new();
        for name in &self.forward_headers {
            if let Some(value) = inbound.get(name)
                && !value.is_empty()
            {
                outbound.insert(name.clone(), value.clone());
            }
        }
        outbound
    }

    /// Send one POST upstream and collect its status and body.
    pub async fn forward(
        &self,
        path_and_query: &str,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse> {
        let url = self.target_url(path_and_query);
        let headers = self.forwarded_headers(inbound_headers);

        tracing::debug!(
            url = %url,
            headers = headers.len(),
            bytes = body.len(),
            "Forwarding request upstream"
        );

        let mut req = self.client.post(&url).headers(headers).body(body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(status = %status.as_u16(), "Relaying upstream error status");
        }

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarder() -> Forwarder {
        Forwarder::new(&ProxyConfig::default()).unwrap()
    }

    #[test]
    fn test_target_url_strips_prefix() {
        assert_eq!(
            forwarder().target_url("/api/anthropic/v1/messages"),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn test_target_url_keeps_query() {
        assert_eq!(
            forwarder().target_url("/api/anthropic/v1/models?limit=5"),
            "https://api.anthropic.com/v1/models?limit=5"
        );
    }

    #[test]
    fn test_target_url_strips_first_occurrence_only() {
        assert_eq!(
            forwarder().target_url("/api/anthropic/x/api/anthropic"),
            "https://api.anthropic.com/x/api/anthropic"
        );
    }

    #[test]
    fn test_target_url_trailing_slash_base() {
        let config = ProxyConfig::default().with_upstream_url("http://localhost:9000/");
        let forwarder = Forwarder::new(&config).unwrap();
        assert_eq!(
            forwarder.target_url("/api/anthropic/v1/messages"),
            "http://localhost:9000/v1/messages"
        );
    }

    #[test]
    fn test_forwarded_headers_allow_list() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-api-key", HeaderValue::from_static("sk-test"));
        inbound.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        inbound.insert("content-type", HeaderValue::from_static("application/json"));
        inbound.insert("cookie", HeaderValue::from_static("session=1"));
        inbound.insert("user-agent", HeaderValue::from_static("Mozilla/5.0"));
        inbound.insert("authorization", HeaderValue::from_static("Bearer x"));

        let outbound = forwarder().forwarded_headers(&inbound);

        assert_eq!(outbound.len(), 3);
        assert_eq!(outbound["x-api-key"], "sk-test");
        assert_eq!(outbound["anthropic-version"], "2023-06-01");
        assert_eq!(outbound["content-type"], "application/json");
        assert!(outbound.get("cookie").is_none());
        assert!(outbound.get("anthropic-dangerous-client-side-api-keys").is_none());
    }

    #[test]
    fn test_forwarded_headers_skip_empty() {
        let mut inbound = HeaderMap::new();
        inbound.insert("x-api-key", HeaderValue::from_static(""));

        assert!(forwarder().forwarded_headers(&inbound).is_empty());
    }

    #[test]
    fn test_invalid_forward_header_name() {
        let config = ProxyConfig::default().with_forward_headers(vec!["bad header".to_string()]);
        assert!(matches!(
            Forwarder::new(&config),
            Err(ProxyError::Config(_))
        ));
    }

    #[test]
    fn test_upstream_response_relay() {
        let response = UpstreamResponse {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: Bytes::from_static(b"rate limited"),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
