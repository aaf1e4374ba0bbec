//! Database row types for `SQLx`.

use chrono::{DateTime, Utc};
use dm_model::DirectoryEntry;
use sqlx::FromRow;

/// Database row for `directory_entries`.
#[derive(Debug, Clone, FromRow)]
pub struct DirectoryEntryRow {
    /// Surrogate key.
    pub id: i64,
    /// External identifier.
    pub external_id: String,
    /// Display name.
    pub display_name: String,
    /// First insertion time.
    pub created_at: DateTime<Utc>,
    /// Last confirming sync pass.
    pub updated_at: DateTime<Utc>,
}

impl From<DirectoryEntryRow> for DirectoryEntry {
    fn from(row: DirectoryEntryRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            display_name: row.display_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Result row of the touch upsert.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct UpsertRow {
    /// True when the statement inserted the row rather than updating it.
    pub inserted: bool,
}
