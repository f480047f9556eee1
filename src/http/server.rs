//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with both handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{http::header::InvalidHeaderValue, routing::any, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::download::download_handler;
use crate::github::{GithubClient, GithubError};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::stats::{stats_handler, CorsPolicy};

/// Route of the release proxy.
pub const DOWNLOAD_PATH: &str = "/api/serverless/download";
/// Route of the stats aggregator.
pub const STATS_PATH: &str = "/api/write-stats";

/// Errors raised while building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build GitHub client: {0}")]
    Github(#[from] GithubError),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(#[from] InvalidHeaderValue),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub github: GithubClient,
    pub cors: CorsPolicy,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let github = GithubClient::new(&config.github)?;
        let cors = CorsPolicy::new(&config.stats.allowed_origin)?;
        Ok(Self {
            config: Arc::new(config),
            github,
            cors,
        })
    }
}

/// HTTP server hosting both handlers.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState::new(config)?;
        Ok(Self {
            router: build_router(state),
        })
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route(DOWNLOAD_PATH, any(download_handler))
        .route(STATS_PATH, any(stats_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
}
