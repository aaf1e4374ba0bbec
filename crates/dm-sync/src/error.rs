//! Sync error types.

use dm_storage::StorageError;
use thiserror::Error;

/// Errors that can occur during a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The roster could not be fetched. Nothing was reconciled.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream directory is throttling requests. Nothing was reconciled.
    #[error("Upstream rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds the upstream asked callers to wait.
        retry_after_secs: u64,
    },

    /// The reconciliation transaction failed and was rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// Creates an upstream unavailable error.
    #[must_use]
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    /// Checks if the failure happened before reconciliation started.
    #[must_use]
    pub const fn is_upstream_error(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_) | Self::RateLimited { .. })
    }

    /// Checks if the failure came from the store.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
