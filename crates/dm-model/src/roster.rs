//! Roster snapshots fetched from the external directory.

use serde::{Deserialize, Serialize};

use crate::entry::{DirectoryKey, KeySet};

/// A normalized record from the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Identifier assigned by the external system.
    pub external_id: String,
    /// Current label for the identifier.
    pub display_name: String,
    /// Whether the external system marks the member as deleted.
    #[serde(default)]
    pub deleted: bool,
}

impl RosterEntry {
    /// Creates a live (non-deleted) roster entry.
    #[must_use]
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
            deleted: false,
        }
    }

    /// Marks the entry as deleted.
    #[must_use]
    pub const fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Returns the identity key of this entry.
    #[must_use]
    pub fn key(&self) -> DirectoryKey {
        DirectoryKey::new(&self.external_id, &self.display_name)
    }
}

/// A full snapshot of the external directory.
///
/// A roster is always complete: reconciling against it removes every
/// local entry whose key it does not contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Creates a roster from fetched entries.
    #[must_use]
    pub const fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Returns all fetched entries, including deleted ones.
    #[must_use]
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Returns the distinct keys of entries that are not deleted.
    #[must_use]
    pub fn keys(&self) -> KeySet {
        self.entries
            .iter()
            .filter(|e| !e.deleted)
            .map(RosterEntry::key)
            .collect()
    }

    /// Returns the number of fetched entries, including deleted ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RosterEntry> for Roster {
    fn from_iter<I: IntoIterator<Item = RosterEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<RosterEntry> for Roster {
    fn extend<I: IntoIterator<Item = RosterEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
