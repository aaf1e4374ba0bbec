//! Fetch-then-reconcile orchestration.

use dm_model::{DirectoryEntry, KeySet};
use tracing::{debug, instrument, warn};

use crate::error::SyncResult;
use crate::provider::RosterSource;
use crate::reconcile::Reconciler;
use crate::sync::ReconcileOutcome;

/// Mirrors a roster source into the store.
///
/// The store is only touched after a roster was fetched in full. A failed
/// fetch surfaces as an upstream error and leaves the store as it was.
#[derive(Debug, Clone)]
pub struct DirectorySync<S> {
    source: S,
    reconciler: Reconciler,
}

impl<S: RosterSource> DirectorySync<S> {
    /// Creates a new sync service.
    #[must_use]
    pub const fn new(source: S, reconciler: Reconciler) -> Self {
        Self { source, reconciler }
    }

    /// Returns the roster source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Fetches the roster and runs one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the fetch fails (nothing is reconciled)
    /// or a storage error if the pass was rolled back.
    #[instrument(skip_all, fields(source = self.source.source_name()))]
    pub async fn sync(&self, access_token: &str) -> SyncResult<ReconcileOutcome> {
        let roster = self
            .source
            .fetch_roster(access_token)
            .await
            .inspect_err(|e| warn!(error = %e, "Roster fetch failed, skipping reconciliation"))?;

        let keys = roster.keys();
        debug!(
            fetched = roster.len(),
            distinct_live = keys.len(),
            "Roster fetched"
        );

        Ok(self.reconciler.reconcile(&keys).await?)
    }

    /// Returns the live key set without syncing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn live_keys(&self) -> SyncResult<KeySet> {
        Ok(self.reconciler.live_keys().await?)
    }

    /// Returns all persisted entries without syncing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn entries(&self) -> SyncResult<Vec<DirectoryEntry>> {
        Ok(self.reconciler.entries().await?)
    }
}
