//! OAuth 2.0 authorization-code exchange against the Strava token endpoint.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Serialize;

use crate::error::{OAuthError, Result};

/// Strava OAuth token endpoint.
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Grant type sent with every exchange.
pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";

/// Token endpoint and application credentials.
#[derive(Debug, Clone)]
pub struct TokenExchangeConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Default for TokenExchangeConfig {
    fn default() -> Self {
        Self::strava(String::new(), String::new())
    }
}

impl TokenExchangeConfig {
    /// Create config for the Strava token endpoint.
    pub fn strava(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            token_url: STRAVA_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Point the exchange at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

/// JSON body of the token request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenExchangeRequest {
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub grant_type: String,
}

impl TokenExchangeRequest {
    pub fn new(config: &TokenExchangeConfig, code: &str) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            code: code.to_string(),
            grant_type: AUTHORIZATION_CODE_GRANT.to_string(),
        }
    }
}

/// A successful token response.
///
/// The body is kept untyped; only `access_token` is required.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    access_token: String,
    raw: serde_json::Value,
}

impl TokenGrant {
    /// Build a grant from the decoded response body.
    pub fn from_json(raw: serde_json::Value) -> Result<Self> {
        let access_token = raw
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| OAuthError::Backend("Token response has no access_token".to_string()))?
            .to_string();

        Ok(Self { access_token, raw })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Expiry of the access token, when the endpoint reports one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.raw
            .get("expires_at")
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// "Firstname Lastname" of the authorizing athlete, if included.
    pub fn athlete_name(&self) -> Option<String> {
        let athlete = self.raw.get("athlete")?;
        let first = athlete.get("firstname").and_then(|v| v.as_str());
        let last = athlete.get("lastname").and_then(|v| v.as_str());
        match (first, last) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => None,
        }
    }
}

/// Result of a completed exchange.
#[derive(Debug, Clone)]
pub enum TokenOutcome {
    /// The endpoint issued a token.
    Granted(TokenGrant),
    /// The endpoint answered with a non-2xx status.
    Rejected {
        status: StatusCode,
        body: serde_json::Value,
    },
}

/// Exchange an authorization code for an access token.
///
/// Issues exactly one POST. Credentials are sent as given, without
/// validation.
pub async fn exchange_code(config: &TokenExchangeConfig, code: &str) -> Result<TokenOutcome> {
    let request_body = TokenExchangeRequest::new(config, code);

    tracing::debug!(url = %config.token_url, "Exchanging authorization code");

    let client = reqwest::Client::new();
    let response = client
        .post(&config.token_url)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(&request_body)?)
        .send()
        .await
        .map_err(|e| OAuthError::Network(format!("Token exchange request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| OAuthError::Network(format!("Failed to read token response: {}", e)))?;

    if !status.is_success() {
        tracing::debug!(status = %status.as_u16(), "Token exchange rejected");
        return Ok(TokenOutcome::Rejected {
            status,
            body: decode_error_body(&body),
        });
    }

    let raw: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| OAuthError::Backend(format!("Failed to parse token response: {}", e)))?;

    Ok(TokenOutcome::Granted(TokenGrant::from_json(raw)?))
}

/// Decode an error body as JSON, keeping non-JSON text as a JSON string.
fn decode_error_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}
