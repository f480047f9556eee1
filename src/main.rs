//! Release Gateway
//!
//! Two stateless endpoints in front of the GitHub API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 RELEASE GATEWAY               │
//!   GET download     │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│ download │──▶│selection │──▶│  github  │──┼──▶ releases API
//!   ◀── zip stream ──┼──│ handler  │◀──┴──────────┘   │  client  │◀─┼─── asset bytes
//!                    │  └──────────┘                  │          │  │
//!   POST write-stats │  ┌──────────┐   ┌──────────┐   │          │  │
//!   ─────────────────┼─▶│  stats   │──▶│ document │──▶│          │──┼──▶ gists API
//!   ◀── {stats} ─────┼──│ handler  │◀──┴──────────┘   └──────────┘◀─┼───
//!                    │  └──────────┘                                 │
//!                    │  config · observability · lifecycle           │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use release_gateway::config::{self, GatewayConfig};
use release_gateway::lifecycle::{signals, Shutdown};
use release_gateway::observability::{logging, metrics};
use release_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "release-gateway")]
#[command(about = "Release download proxy and stats writer for the GitHub API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<GatewayConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::from_env()?,
    };
    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
        config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("release-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        repository = %format!("{}/{}", config.github.owner, config.github.repository),
        credential_configured = config.token().is_some(),
        gist_configured = config.gist_id().is_some(),
        "Configuration loaded"
    );

    if config.token().is_none() {
        tracing::warn!("No GitHub credential configured; both endpoints will answer 500");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
