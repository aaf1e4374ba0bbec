//! # dm-server
//!
//! Axum server for the directory mirror.
//!
//! Exposes one endpoint that fetches the Slack roster with the caller's token
//! and reconciles the mirror table, a read-only view of the mirror, and
//! health probes.
//!
//! ## Usage
//!
//! ```ignore
//! use dm_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let server = Server::new(config).await?;
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use dm_slack::SlackClient;
use dm_sync::{DirectorySync, Reconciler};
use sqlx::PgPool;
use tokio::net::TcpListener;

/// The directory mirror server.
pub struct Server {
    config: ServerConfig,
    pool: PgPool,
    sync: DirectorySync<SlackClient>,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// This initializes the database connection pool, applies migrations if
    /// enabled, and builds the Slack client.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool, the migrations or the Slack client fail.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let pool = dm_storage::create_pool(&config.pool_config()).await?;
        tracing::info!("Database connection pool created");

        if config.run_migrations {
            dm_storage::run_migrations(&pool).await?;
        }

        let client = SlackClient::new(config.slack_config())?;
        let reconciler = Reconciler::new(pool.clone()).with_strategy(config.prune_strategy);
        let sync = DirectorySync::new(client, reconciler);

        Ok(Self { config, pool, sync })
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or serving fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let app = self.test_router();

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            strategy = %self.config.prune_strategy,
            "Server listening on http://{}",
            listener.local_addr()?
        );

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Returns the database pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Creates the application router without starting the server.
    ///
    /// This is useful for integration testing.
    pub fn test_router(&self) -> Router {
        let state = AppState::new(self.config.clone(), self.sync.clone(), self.pool.clone());
        create_router(state)
    }
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
