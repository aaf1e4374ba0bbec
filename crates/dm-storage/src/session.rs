//! Explicit transactional sessions.
//!
//! Every directory query runs against a [`DirectorySession`] handed in by
//! the caller instead of an ambient connection. A session wraps one open
//! transaction; once it is committed or rolled back the handle stays around
//! but every further query fails with `StorageError::InvalidSession`.

use std::fmt;

use sqlx::postgres::{PgConnection, PgPool};
use sqlx::{Postgres, Transaction};

use crate::error::{StorageError, StorageResult};

/// A transactional scope over the directory store.
///
/// Dropping an active session without committing rolls the transaction back.
#[derive(Default)]
pub struct DirectorySession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorySession")
            .field("active", &self.is_active())
            .finish()
    }
}

impl DirectorySession {
    /// Begins a new transaction on the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired or `BEGIN` fails.
    pub async fn begin(pool: &PgPool) -> StorageResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(format!("begin failed: {e}")))?;
        Ok(Self { tx: Some(tx) })
    }

    /// Returns true while the transaction is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    /// Returns the connection of the open transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSession` if the session is not active.
    pub fn connection(&mut self) -> StorageResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or(StorageError::InvalidSession("no open transaction"))
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSession` if the session is not active,
    /// or `StorageError::Transaction` if `COMMIT` fails.
    pub async fn commit(&mut self) -> StorageResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or(StorageError::InvalidSession("commit without open transaction"))?;
        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(format!("commit failed: {e}")))
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSession` if the session is not active,
    /// or `StorageError::Transaction` if `ROLLBACK` fails.
    pub async fn rollback(&mut self) -> StorageResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or(StorageError::InvalidSession("rollback without open transaction"))?;
        tx.rollback()
            .await
            .map_err(|e| StorageError::Transaction(format!("rollback failed: {e}")))
    }
}
