//! Directory entry domain model.
//!
//! A directory entry mirrors one member of the external directory. Its
//! identity is the `(external_id, display_name)` pair, not the surrogate id:
//! a member whose display name changes becomes a different entry.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The identity key of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectoryKey {
    /// Identifier assigned by the external system (e.g. a Slack user ID).
    pub external_id: String,
    /// Label associated with the external identifier.
    pub display_name: String,
}

impl DirectoryKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for DirectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.external_id, self.display_name)
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for DirectoryKey {
    fn from((external_id, display_name): (A, B)) -> Self {
        Self::new(external_id, display_name)
    }
}

/// A set of live directory keys, ordered for stable iteration.
pub type KeySet = BTreeSet<DirectoryKey>;

/// A persisted directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Surrogate identifier assigned by the store.
    pub id: i64,
    /// Identifier assigned by the external system.
    pub external_id: String,
    /// Label associated with the external identifier at last sync.
    pub display_name: String,
    /// When the entry was first inserted.
    pub created_at: DateTime<Utc>,
    /// When a sync pass last confirmed the entry.
    pub updated_at: DateTime<Utc>,
}

impl DirectoryEntry {
    /// Returns the identity key of this entry.
    #[must_use]
    pub fn key(&self) -> DirectoryKey {
        DirectoryKey::new(&self.external_id, &self.display_name)
    }
}
