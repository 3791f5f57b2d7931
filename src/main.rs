//! Multi-chain portfolio aggregator (v1)
//!
//! Accepts a list of wallets over HTTP, looks each one up on its chain's
//! public APIs, prices the holdings and returns one entry per wallet.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http (axum, request id, timeout, body limit)
//!                       │
//!                       ▼
//!                  portfolio::dispatch ──▶ chains::registry
//!                       │                    ├─ bitcoin  (blockchain.info / blockstream)
//!                       │                    ├─ ethereum (blockscout)
//!                       │                    ├─ solana   (JSON-RPC)
//!                       │                    └─ cardano  (koios)
//!                       ▼
//!                  pricing::fetch_prices ──▶ coingecko (one call per request)
//!                       │
//!                       ▼
//!                  portfolio::assemble
//!     ◀─────────────────┘
//!     Client Response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use portfolio_aggregator::config::{apply_env_overrides, load_config, AggregatorConfig};
use portfolio_aggregator::lifecycle::signals::spawn_signal_listener;
use portfolio_aggregator::observability::{logging, metrics};
use portfolio_aggregator::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "portfolio-aggregator")]
#[command(about = "Multi-chain crypto portfolio aggregator", long_about = None)]
struct Args {
    /// Path to a TOML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AggregatorConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    apply_env_overrides(&mut config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "portfolio-aggregator starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
