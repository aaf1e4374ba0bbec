//! The reconciliation engine.
//!
//! A pass brings `directory_entries` in line with a full roster snapshot in
//! one transaction:
//!
//! 1. pick a pass timestamp `T` newer than every stored `updated_at`
//! 2. upsert every roster key, setting `updated_at = T`
//! 3. delete every row with `updated_at < T`
//! 4. re-read the live key set
//!
//! Rows whose key survives keep their id and `created_at`; only `updated_at`
//! moves. The prune decision uses nothing but what step 2 wrote inside the
//! same transaction, so the full table is never loaded into memory.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use dm_model::{DirectoryEntry, KeySet};
use dm_storage::directory;
use dm_storage::{DirectorySession, StorageResult};
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::sync::{PruneStrategy, ReconcileOutcome, SyncReport};

/// Picks the timestamp for a pass.
///
/// Truncated to microseconds (the store's resolution) and forced strictly
/// past `latest`, so rows touched by earlier passes always compare older even
/// if the wall clock stepped backwards.
#[must_use]
pub fn pass_timestamp(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match latest {
        Some(latest) if latest >= now => latest + Duration::microseconds(1),
        _ => now,
    }
}

/// Reconciles the store with `keys` inside the caller's session.
///
/// Returns the live key set after the pass. The session is not committed;
/// the caller decides whether the pass becomes visible.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or
/// any storage error raised by the pass. The session should then be rolled
/// back.
pub async fn reconcile(session: &mut DirectorySession, keys: &KeySet) -> StorageResult<KeySet> {
    reconcile_with_strategy(session, keys, PruneStrategy::Timestamp)
        .await
        .map(|outcome| outcome.live)
}

/// Reconciles the store with `keys` using the given strategy.
///
/// # Errors
///
/// See [`reconcile`].
pub async fn reconcile_with_strategy(
    session: &mut DirectorySession,
    keys: &KeySet,
    strategy: PruneStrategy,
) -> StorageResult<ReconcileOutcome> {
    let mut report = SyncReport::new(strategy, Utc::now());

    let stale = match strategy {
        PruneStrategy::Timestamp => None,
        PruneStrategy::KeyDiff => {
            let existing = directory::live_keys(session).await?;
            Some(existing.difference(keys).cloned().collect::<KeySet>())
        }
    };

    let latest = directory::latest_update(session).await?;
    let at = pass_timestamp(Utc::now(), latest);

    let counts = directory::upsert_touch(session, keys, at).await?;
    report.added = counts.inserted;
    report.updated = counts.touched;

    report.removed = match stale {
        None => directory::prune_untouched(session, at).await?,
        Some(stale) => directory::delete_by_keys(session, &stale).await?,
    };
    debug!(
        %strategy,
        pass_at = %at,
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        "Reconciliation statements applied"
    );

    let live = directory::live_keys(session).await?;
    if live != *keys {
        // Only possible if another writer committed into the table mid-pass.
        warn!(
            expected = keys.len(),
            actual = live.len(),
            "Live key set differs from roster after reconciliation"
        );
    }

    Ok(ReconcileOutcome {
        live,
        report: report.complete(),
    })
}

/// Runs reconciliation passes in their own transactions.
#[derive(Debug, Clone)]
pub struct Reconciler {
    pool: PgPool,
    strategy: PruneStrategy,
}

impl Reconciler {
    /// Creates a reconciler using the timestamp strategy.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            strategy: PruneStrategy::Timestamp,
        }
    }

    /// Sets the prune strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: PruneStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Returns the prune strategy.
    #[must_use]
    pub const fn strategy(&self) -> PruneStrategy {
        self.strategy
    }

    /// Returns the database pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs one pass and commits it.
    ///
    /// On failure the transaction is rolled back and the store keeps its
    /// state from before the call.
    ///
    /// # Errors
    ///
    /// Returns the storage error that aborted the pass.
    pub async fn reconcile(&self, keys: &KeySet) -> StorageResult<ReconcileOutcome> {
        let mut session = DirectorySession::begin(&self.pool).await?;

        match reconcile_with_strategy(&mut session, keys, self.strategy).await {
            Ok(outcome) => {
                session.commit().await?;
                info!(
                    strategy = %self.strategy,
                    live = outcome.live.len(),
                    added = outcome.report.added,
                    removed = outcome.report.removed,
                    "{}",
                    outcome.report.status
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(error = %err, "Reconciliation failed, rolling back");
                if let Err(rollback_err) = session.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Returns the live key set without syncing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn live_keys(&self) -> StorageResult<KeySet> {
        let mut session = DirectorySession::begin(&self.pool).await?;
        let keys = directory::live_keys(&mut session).await?;
        session.commit().await?;
        Ok(keys)
    }

    /// Returns all persisted entries without syncing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails.
    pub async fn entries(&self) -> StorageResult<Vec<DirectoryEntry>> {
        let mut session = DirectorySession::begin(&self.pool).await?;
        let entries = directory::list_entries(&mut session).await?;
        session.commit().await?;
        Ok(entries)
    }
}
