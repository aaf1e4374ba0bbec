//! Queries over `directory_entries`.
//!
//! All functions take the caller's [`DirectorySession`] and check it before
//! touching the database, so a finished session fails with
//! `StorageError::InvalidSession` without any I/O. Key sets are bound as two
//! parallel `text[]` arrays and expanded with `UNNEST`, so each operation is a
//! single statement regardless of how many keys it covers.

use chrono::{DateTime, Utc};
use dm_model::{DirectoryEntry, DirectoryKey, KeySet};

use crate::entities::{DirectoryEntryRow, UpsertRow};
use crate::error::{from_sqlx_error, StorageResult};
use crate::session::DirectorySession;

/// Row counts reported by [`upsert_touch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    /// Keys that had no row and were inserted.
    pub inserted: u64,
    /// Keys that already had a row whose `updated_at` was refreshed.
    pub touched: u64,
}

/// Splits a key set into parallel column arrays for `UNNEST`.
fn key_columns(keys: &KeySet) -> (Vec<&str>, Vec<&str>) {
    keys.iter()
        .map(|k| (k.external_id.as_str(), k.display_name.as_str()))
        .unzip()
}

/// Returns the live key set.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error if the query fails.
pub async fn live_keys(session: &mut DirectorySession) -> StorageResult<KeySet> {
    let conn = session.connection()?;

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT DISTINCT external_id, display_name FROM directory_entries")
            .fetch_all(conn)
            .await
            .map_err(from_sqlx_error)?;

    Ok(rows.into_iter().map(DirectoryKey::from).collect())
}

/// Returns every persisted entry ordered by key.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error if the query fails.
pub async fn list_entries(session: &mut DirectorySession) -> StorageResult<Vec<DirectoryEntry>> {
    let conn = session.connection()?;

    let rows: Vec<DirectoryEntryRow> = sqlx::query_as(
        r"SELECT id, external_id, display_name, created_at, updated_at
        FROM directory_entries
        ORDER BY external_id, display_name",
    )
    .fetch_all(conn)
    .await
    .map_err(from_sqlx_error)?;

    Ok(rows.into_iter().map(DirectoryEntry::from).collect())
}

/// Returns the most recent `updated_at`, or `None` for an empty store.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error if the query fails.
pub async fn latest_update(session: &mut DirectorySession) -> StorageResult<Option<DateTime<Utc>>> {
    let conn = session.connection()?;

    sqlx::query_scalar("SELECT MAX(updated_at) FROM directory_entries")
        .fetch_one(conn)
        .await
        .map_err(from_sqlx_error)
}

/// Inserts missing keys and refreshes `updated_at` on existing ones.
///
/// New rows get `created_at = updated_at = at`; existing rows only get
/// `updated_at = at`, keeping their id and `created_at`.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error (typically `ConstraintViolation`) if the statement fails.
pub async fn upsert_touch(
    session: &mut DirectorySession,
    keys: &KeySet,
    at: DateTime<Utc>,
) -> StorageResult<UpsertCounts> {
    let conn = session.connection()?;
    if keys.is_empty() {
        return Ok(UpsertCounts::default());
    }
    let (external_ids, display_names) = key_columns(keys);

    // xmax is zero only for tuples created by this statement.
    let rows: Vec<UpsertRow> = sqlx::query_as(
        r"INSERT INTO directory_entries (external_id, display_name, created_at, updated_at)
        SELECT k.external_id, k.display_name, $3, $3
        FROM UNNEST($1::text[], $2::text[]) AS k(external_id, display_name)
        ON CONFLICT (external_id, display_name)
        DO UPDATE SET updated_at = EXCLUDED.updated_at
        RETURNING (xmax = 0) AS inserted",
    )
    .bind(&external_ids)
    .bind(&display_names)
    .bind(at)
    .fetch_all(conn)
    .await
    .map_err(from_sqlx_error)?;

    let inserted = rows.iter().filter(|r| r.inserted).count() as u64;
    Ok(UpsertCounts {
        inserted,
        touched: rows.len() as u64 - inserted,
    })
}

/// Deletes every row whose `updated_at` is older than `before`.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error if the statement fails.
pub async fn prune_untouched(
    session: &mut DirectorySession,
    before: DateTime<Utc>,
) -> StorageResult<u64> {
    let conn = session.connection()?;

    let result = sqlx::query("DELETE FROM directory_entries WHERE updated_at < $1")
        .bind(before)
        .execute(conn)
        .await
        .map_err(from_sqlx_error)?;

    Ok(result.rows_affected())
}

/// Deletes exactly the rows matching `keys`.
///
/// Keys with no matching row are ignored. An empty set issues no statement.
///
/// # Errors
///
/// Returns `StorageError::InvalidSession` if the session is not active, or a
/// storage error if the statement fails.
pub async fn delete_by_keys(session: &mut DirectorySession, keys: &KeySet) -> StorageResult<u64> {
    let conn = session.connection()?;
    if keys.is_empty() {
        return Ok(0);
    }
    let (external_ids, display_names) = key_columns(keys);

    let result = sqlx::query(
        r"DELETE FROM directory_entries d
        USING UNNEST($1::text[], $2::text[]) AS k(external_id, display_name)
        WHERE d.external_id = k.external_id AND d.display_name = k.display_name",
    )
    .bind(&external_ids)
    .bind(&display_names)
    .execute(conn)
    .await
    .map_err(from_sqlx_error)?;

    Ok(result.rows_affected())
}
