//! Common test utilities for integration tests.

use std::net::SocketAddr;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;
use tokio::sync::oneshot;

use runiq_proxy::{ProxyConfig, ProxyServer};

/// A dev server running in the background on an ephemeral port.
pub struct TestProxy {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client for talking to the server.
    pub client: Client,
    /// Static root served for GET requests.
    pub root: TempDir,
    /// Dropping this stops the server.
    _shutdown: oneshot::Sender<()>,
}

impl TestProxy {
    /// Start a server that forwards to `upstream_url`.
    pub async fn start(upstream_url: &str) -> Result<Self> {
        Self::start_with(|config| config.with_upstream_url(upstream_url)).await
    }

    /// Start a server with a customised config.
    pub async fn start_with(customise: impl FnOnce(ProxyConfig) -> ProxyConfig) -> Result<Self> {
        let root = TempDir::new()?;
        let config = ProxyConfig::new("127.0.0.1:0".parse()?)
            .with_static_root(root.path())
            .with_request_logging(false);
        let server = ProxyServer::new(customise(config))?;

        let (tx, rx) = oneshot::channel::<()>();
        let addr = server
            .run_with_shutdown(async move {
                rx.await.ok();
            })
            .await?;

        Ok(Self {
            addr,
            client: Client::new(),
            root,
            _shutdown: tx,
        })
    }

    /// Full URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// A URL on localhost where nothing is listening.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}
