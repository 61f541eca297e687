//! Binary entry point for the Parlor relay server.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use parlor_server::{ServerConfig, metrics, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    let metrics_handle = metrics::install_recorder();

    let handle = server::start(config, metrics_handle)
        .await
        .context("failed to start server")?;
    info!(addr = %handle.addr, "parlor relay ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");
    handle.shutdown();
    Ok(())
}
