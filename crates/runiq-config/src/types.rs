//! Configuration types.
//!
//! Every field is optional so that layers can be merged field by field;
//! unset values fall back to the defaults of the consuming crate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root configuration (`runiq.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuniqConfig {
    /// Dev proxy server settings (`[server]`).
    pub server: Option<ServerSection>,

    /// Strava token exchange settings (`[strava]`).
    pub strava: Option<StravaSection>,
}

impl RuniqConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: RuniqConfig) {
        if let Some(layer) = other.server {
            self.server.get_or_insert_with(ServerSection::default).merge(layer);
        }

        if let Some(layer) = other.strava {
            self.strava.get_or_insert_with(StravaSection::default).merge(layer);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Dev proxy server section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Port to listen on.
    pub port: Option<u16>,
    /// Address to bind to.
    pub bind: Option<String>,
    /// Directory served for GET/HEAD requests.
    pub static_root: Option<PathBuf>,
    /// Upstream base URL for proxied requests.
    pub upstream_url: Option<String>,
    /// Path prefix that marks a request as proxied.
    pub api_prefix: Option<String>,
    /// Request headers copied to the upstream request.
    pub forward_headers: Option<Vec<String>>,
    /// Upstream request timeout in seconds. Unset means no timeout.
    pub upstream_timeout_secs: Option<u64>,
    /// Maximum accepted request body size in bytes.
    pub max_body_size: Option<usize>,
}

impl ServerSection {
    fn merge(&mut self, other: ServerSection) {
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.bind.is_some() {
            self.bind = other.bind;
        }
        if other.static_root.is_some() {
            self.static_root = other.static_root;
        }
        if other.upstream_url.is_some() {
            self.upstream_url = other.upstream_url;
        }
        if other.api_prefix.is_some() {
            self.api_prefix = other.api_prefix;
        }
        if other.forward_headers.is_some() {
            self.forward_headers = other.forward_headers;
        }
        if other.upstream_timeout_secs.is_some() {
            self.upstream_timeout_secs = other.upstream_timeout_secs;
        }
        if other.max_body_size.is_some() {
            self.max_body_size = other.max_body_size;
        }
    }

    /// Validate values that TOML typing cannot catch.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(prefix) = &self.api_prefix
            && !prefix.starts_with('/')
        {
            return Err(ConfigError::Other(format!(
                "[server] api_prefix must start with '/', got '{}'",
                prefix
            )));
        }
        if self.max_body_size == Some(0) {
            return Err(ConfigError::Other(
                "[server] max_body_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Strava Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Strava token exchange section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StravaSection {
    /// Token endpoint URL.
    pub token_url: Option<String>,
    /// Application client ID.
    pub client_id: Option<String>,
    /// Application client secret.
    pub client_secret: Option<String>,
}

impl StravaSection {
    fn merge(&mut self, other: StravaSection) {
        if other.token_url.is_some() {
            self.token_url = other.token_url;
        }
        if other.client_id.is_some() {
            self.client_id = other.client_id;
        }
        if other.client_secret.is_some() {
            self.client_secret = other.client_secret;
        }
    }

    pub fn has_plaintext_secret(&self) -> bool {
        self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}
