//! # dm-sync
//!
//! Reconciliation engine for the directory mirror.
//!
//! Given a full roster snapshot, a pass atomically inserts new keys, refreshes
//! surviving ones and deletes the rest, so the store converges to exactly the
//! roster's live keys. See [`mod@reconcile`] for the algorithm.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod provider;
pub mod reconcile;
pub mod service;
pub mod sync;

pub use error::{SyncError, SyncResult};
pub use provider::RosterSource;
pub use reconcile::{pass_timestamp, reconcile, reconcile_with_strategy, Reconciler};
pub use service::DirectorySync;
pub use sync::{PruneStrategy, ReconcileOutcome, SyncReport};
