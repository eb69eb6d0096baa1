//! One-shot OAuth 2.0 authorization-code exchange for Strava.
//!
//! Trades an authorization code for an access token with a single POST to
//! the token endpoint. Rejections from the endpoint come back as a
//! [`TokenOutcome::Rejected`] value rather than an error.

pub mod error;
pub mod oauth;

pub use error::{OAuthError, Result};
pub use oauth::{
    STRAVA_TOKEN_URL, TokenExchangeConfig, TokenExchangeRequest, TokenGrant, TokenOutcome,
    exchange_code,
};
pub use reqwest::StatusCode;
