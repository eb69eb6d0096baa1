//! Serve command - runs the local dev server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;

use runiq_config::ServerSection;
use runiq_proxy::{ProxyConfig, ProxyServer};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config, default 8080)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config, default all interfaces)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Directory to serve static files from (overrides config, default current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Upstream API base URL (overrides config)
    #[arg(long)]
    pub upstream: Option<String>,

    /// Upstream request timeout in seconds (overrides config, default none)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let section = loaded.config.server.unwrap_or_default();
    let config = build_config(args, section)?;

    let port = config.bind_addr.port();
    let prefix = config.api_prefix.clone();
    let server = ProxyServer::new(config)?;

    println!();
    println!("  RunIQ Dev Server running at http://localhost:{}", port);
    println!(
        "  Anthropic API proxy at http://localhost:{}{}",
        port, prefix
    );
    println!("  Press Ctrl+C to stop");
    println!();

    server.run().await.context("Dev server failed")?;
    Ok(())
}

/// Layer CLI flags over the config file section over built-in defaults.
fn build_config(args: ServeArgs, section: ServerSection) -> Result<ProxyConfig> {
    section.validate()?;

    let defaults = ProxyConfig::default();

    let ip = match args.bind.or(section.bind) {
        Some(bind) => bind
            .parse::<IpAddr>()
            .with_context(|| format!("Invalid bind address '{}'", bind))?,
        None => defaults.bind_addr.ip(),
    };
    let port = args
        .port
        .or(section.port)
        .unwrap_or(defaults.bind_addr.port());

    let mut config = ProxyConfig::new(SocketAddr::new(ip, port));

    if let Some(root) = args.root.or(section.static_root) {
        config = config.with_static_root(root);
    }
    if let Some(url) = args.upstream.or(section.upstream_url) {
        config = config.with_upstream_url(url);
    }
    if let Some(prefix) = section.api_prefix {
        config = config.with_api_prefix(prefix);
    }
    if let Some(headers) = section.forward_headers {
        config = config.with_forward_headers(headers);
    }
    if let Some(secs) = args.timeout.or(section.upstream_timeout_secs) {
        config = config.with_upstream_timeout(Duration::from_secs(secs));
    }
    if let Some(size) = section.max_body_size {
        config = config.with_max_body_size(size);
    }

    Ok(config)
}
