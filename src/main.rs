//! radix-router server binary.
//!
//! Loads a TOML route table (first argument, default `router.toml`; built-in
//! defaults when the file is absent), builds the router, and serves it until
//! SIGINT or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use radix_router::config::load_or_default;
use radix_router::http::HttpServer;
use radix_router::lifecycle::signals::spawn_signal_handler;
use radix_router::lifecycle::{build_pool, build_router, Shutdown, StartupError};
use radix_router::observability::{init_logging, init_metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("router.toml"));

    let config = load_or_default(&config_path).map_err(StartupError::from)?;
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        routes = config.routes.len(),
        "radix-router starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = Arc::new(build_router(&config.routes)?);
    let pool = Arc::new(build_pool(&config.pool));

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_rx = shutdown.subscribe();
    spawn_signal_handler(shutdown);

    HttpServer::new(router, pool, &config)
        .run(listener, server_rx)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
