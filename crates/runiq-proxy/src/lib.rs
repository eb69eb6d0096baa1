//! Local development server for RunIQ.
//!
//! Serves static files and forwards browser calls to the Anthropic API,
//! adding permissive CORS headers so a page on `localhost` can read the
//! responses.
//!
//! # Components
//!
//! - [`config`]: bind address, static root, upstream and header allow-list
//! - [`server`]: axum router and method dispatch
//! - [`forward`]: path rewrite, header filtering and the upstream call
//! - [`static_files`]: GET/HEAD file serving with an explicit MIME table
//! - [`cors`]: the CORS headers attached to preflight and proxied responses

pub mod config;
pub mod cors;
pub mod error;
pub mod forward;
mod logging;
pub mod server;
pub mod static_files;

pub use config::{ANTHROPIC_API_URL, DEFAULT_API_PREFIX, DEFAULT_PORT, ProxyConfig};
pub use error::{ProxyError, Result};
pub use forward::{Forwarder, UpstreamResponse};
pub use server::ProxyServer;
pub use static_files::StaticFiles;
