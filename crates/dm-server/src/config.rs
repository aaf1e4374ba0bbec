//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::str::FromStr;
use std::time::Duration;

use dm_slack::{SlackConfig, DEFAULT_API_BASE_URL};
use dm_storage::PoolConfig;
use dm_sync::PruneStrategy;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Database connection URL.
    pub database_url: String,

    /// Minimum database connections.
    pub db_min_connections: u32,

    /// Maximum database connections.
    pub db_max_connections: u32,

    /// Slack Web API base URL.
    pub slack_api_url: String,

    /// Members requested per `users.list` page.
    pub slack_page_limit: u32,

    /// Slack request timeout in seconds.
    pub slack_timeout_secs: u64,

    /// How reconciliation passes prune absent keys.
    pub prune_strategy: PruneStrategy,

    /// Apply pending migrations on startup.
    pub run_migrations: bool,

    /// Log level.
    pub log_level: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or `DM_PRUNE_STRATEGY`
    /// names an unknown strategy.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("DM_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("DM_PORT", 8080);

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let db_min_connections = env_or("DM_DB_MIN_CONNECTIONS", 1);
        let db_max_connections = env_or("DM_DB_MAX_CONNECTIONS", 10);

        let slack_api_url = std::env::var("DM_SLACK_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let slack_page_limit = env_or("DM_SLACK_PAGE_LIMIT", 200);
        let slack_timeout_secs = env_or("DM_SLACK_TIMEOUT_SECS", 30);

        let prune_strategy = match std::env::var("DM_PRUNE_STRATEGY") {
            Ok(v) => v.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => PruneStrategy::default(),
        };

        let run_migrations = std::env::var("DM_RUN_MIGRATIONS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            database_url,
            db_min_connections,
            db_max_connections,
            slack_api_url,
            slack_page_limit,
            slack_timeout_secs,
            prune_strategy,
            run_migrations,
            log_level,
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing(database_url: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            database_url: database_url.to_string(),
            db_min_connections: 1,
            db_max_connections: 5,
            log_level: "debug".to_string(),
            ..Self::default()
        }
    }

    /// Points the Slack client at another base URL.
    #[must_use]
    pub fn with_slack_api_url(mut self, url: impl Into<String>) -> Self {
        self.slack_api_url = url.into();
        self
    }

    /// Returns the database pool configuration.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(&self.database_url)
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
    }

    /// Returns the Slack client configuration.
    #[must_use]
    pub fn slack_config(&self) -> SlackConfig {
        SlackConfig::new(&self.slack_api_url)
            .page_limit(self.slack_page_limit)
            .timeout(Duration::from_secs(self.slack_timeout_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/directory_mirror".to_string(),
            db_min_connections: 1,
            db_max_connections: 10,
            slack_api_url: DEFAULT_API_BASE_URL.to_string(),
            slack_page_limit: 200,
            slack_timeout_secs: 30,
            prune_strategy: PruneStrategy::Timestamp,
            run_migrations: true,
            log_level: "info".to_string(),
        }
    }
}
