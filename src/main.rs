//! tinyircd - a single-server IRC daemon.
//!
//! Every client connection owns its protocol state; shared directories of
//! users and channels are reached only through asynchronous calls whose
//! results re-enter the connection's own task.

mod config;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod state;
mod telemetry;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::Matrix;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        network = %config.server.network,
        sid = %config.server.sid,
        "Starting tinyircd"
    );

    // Metrics are optional; port 0 or no port disables the HTTP endpoint.
    match config.server.metrics_port {
        Some(port) if port != 0 => {
            metrics::init();
            tokio::spawn(http::run_http_server(port));
            info!(port, "Prometheus HTTP server started");
        }
        _ => info!("Metrics disabled"),
    }

    let matrix = Arc::new(Matrix::new(&config));
    info!(
        channels = config.channels.len(),
        motd_lines = matrix.server.motd.len(),
        "Server state initialized"
    );

    let gateway = Gateway::bind(&config, matrix).await?;

    tokio::select! {
        result = gateway.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}
