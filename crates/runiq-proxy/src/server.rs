//! HTTP server for local development.
//!
//! One fallback handler dispatches on method: preflight for `OPTIONS`,
//! static files for `GET`/`HEAD`, upstream forwarding for `POST` under the
//! API prefix. Each connection runs on its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::cors;
use crate::error::{ProxyError, Result};
use crate::forward::{Forwarder, UpstreamResponse};
use crate::logging;
use crate::static_files::StaticFiles;

/// Shared, read-only state for request handlers.
#[derive(Debug)]
pub(crate) struct ProxyState {
    pub(crate) config: ProxyConfig,
    forwarder: Forwarder,
    static_files: StaticFiles,
}

/// The dev server.
pub struct ProxyServer {
    state: Arc<ProxyState>,
}

impl ProxyServer {
    /// Create a server from its configuration.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let forwarder = Forwarder::new(&config)?;
        let static_files = StaticFiles::new(config.static_root.clone());

        Ok(Self {
            state: Arc::new(ProxyState {
                config,
                forwarder,
                static_files,
            }),
        })
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(dispatch)
            .layer(DefaultBodyLimit::disable())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::access_log_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.state.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, root = %self.state.config.static_root.display(), "Starting dev server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Run in the background with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.state.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Starting dev server");
        tokio::spawn(async move {
            axum::serve(listener, self.router())
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn dispatch(State(state): State<Arc<ProxyState>>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    match method {
        Method::OPTIONS => cors::preflight(),
        Method::POST => handle_post(&state, request).await,
        Method::GET | Method::HEAD => state.static_files.serve(request).await,
        _ => StatusCode::NOT_IMPLEMENTED.into_response(),
    }
}

/// POST under the API prefix is forwarded; any other POST is a bare 404.
async fn handle_post(state: &ProxyState, request: Request<Body>) -> Response {
    if !state.config.is_api_path(request.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match proxy_request(state, request).await {
        Ok(upstream) => upstream.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Proxy request failed");
            e.into_response()
        }
    }
}

async fn proxy_request(state: &ProxyState, request: Request<Body>) -> Result<UpstreamResponse> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());

    let limit = state.config.max_body_size.unwrap_or(usize::MAX);
    let body = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ProxyError::InvalidRequest(format!("Failed to read request body: {}", e)))?;

    state
        .forwarder
        .forward(path_and_query, &parts.headers, body)
        .await
}
