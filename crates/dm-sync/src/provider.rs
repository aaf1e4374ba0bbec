//! Roster source trait.
//!
//! A roster source fetches the complete current member list of an external
//! directory. Implementations normalize each member into a
//! [`RosterEntry`](dm_model::RosterEntry) and drop malformed records; deleted
//! members stay in the roster flagged as deleted and are filtered by
//! [`Roster::keys`].

use async_trait::async_trait;
use dm_model::Roster;

use crate::error::SyncResult;

/// Fetches full roster snapshots from an external directory.
///
/// Implementations must return an error, never an empty roster, when the
/// fetch fails: an empty roster prunes every local entry.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Returns the source identifier used in logs.
    fn source_name(&self) -> &'static str;

    /// Fetches the complete roster using the caller's access token.
    ///
    /// ## Errors
    ///
    /// Returns `SyncError::UpstreamUnavailable` or `SyncError::RateLimited`
    /// if the roster cannot be retrieved in full.
    async fn fetch_roster(&self, access_token: &str) -> SyncResult<Roster>;
}
