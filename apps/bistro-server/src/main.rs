//! # BistrOS Floor Server
//!
//! Loads the floor config, builds the engine, and serves it until Ctrl+C
//! or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use bistro_engine::{BistroConfig, FloorService};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting BistrOS floor server...");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = BistroConfig::load(config_path)?;
    let addr = config.server.bind_address();
    info!(
        %addr,
        tables = config.floor.table_count,
        seed_demo = config.floor.seed_demo,
        usage_source = %config.recommendation.usage_source,
        "Configuration loaded"
    );

    let floor = Arc::new(FloorService::new(config));
    let app = bistro_server::build_router(floor);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bistro=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}
