//! # Directory Mirror
//!
//! Main entry point for the directory mirror server.

#![forbid(unsafe_code)]

use dm_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Directory mirror starting...");

    let config = ServerConfig::from_env()?;
    let server = Server::new(config).await?;
    server.run().await
}
