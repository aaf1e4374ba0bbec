//! Application state management.
//!
//! This module defines the shared state that is passed to all request handlers.

use std::sync::Arc;

use dm_slack::SlackClient;
use dm_sync::DirectorySync;
use sqlx::PgPool;

use crate::config::ServerConfig;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,

    /// Fetch-then-reconcile service.
    pub sync: Arc<DirectorySync<SlackClient>>,

    /// Database pool, used by the readiness probe.
    pub pool: PgPool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ServerConfig, sync: DirectorySync<SlackClient>, pool: PgPool) -> Self {
        Self {
            config,
            sync: Arc::new(sync),
            pool,
        }
    }

    /// Returns the sync service.
    pub fn sync(&self) -> &DirectorySync<SlackClient> {
        &self.sync
    }

    /// Returns the server configuration.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}
