//! Storage error types.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A query was issued without an open session.
    ///
    /// Raised before any I/O when the session was never begun or has
    /// already been committed or rolled back.
    #[error("Invalid session: {0}")]
    InvalidSession(&'static str),

    /// The store rejected a write (unique, check, foreign key or not-null).
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Name of the violated constraint, when the database reports it.
        constraint: Option<String>,
        /// Database message.
        message: String,
    },

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Database query error.
    #[error("Database query error: {0}")]
    Query(String),

    /// Transaction begin/commit/rollback error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a constraint violation error.
    #[must_use]
    pub fn constraint(constraint: Option<&str>, message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            constraint: constraint.map(str::to_string),
            message: message.into(),
        }
    }

    /// Checks if this is an invalid session error.
    #[must_use]
    pub const fn is_invalid_session(&self) -> bool {
        matches!(self, Self::InvalidSession(_))
    }

    /// Checks if this is a constraint violation.
    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Checks if this is a connectivity failure.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// SQLSTATE class 23 codes the store can raise for directory_entries.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";

/// Converts a `SQLx` error to a storage error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::Database(db_err) => {
            let is_constraint = db_err.code().is_some_and(|c| {
                matches!(
                    c.as_ref(),
                    UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION | NOT_NULL_VIOLATION | CHECK_VIOLATION
                )
            });
            if is_constraint {
                StorageError::constraint(db_err.constraint(), db_err.message())
            } else {
                StorageError::Query(db_err.to_string())
            }
        }
        SqlxError::PoolTimedOut => StorageError::Connection("Connection pool timeout".to_string()),
        SqlxError::PoolClosed => StorageError::Connection("Connection pool closed".to_string()),
        SqlxError::Io(e) => StorageError::Connection(e.to_string()),
        SqlxError::Tls(e) => StorageError::Connection(e.to_string()),
        SqlxError::Migrate(e) => StorageError::Migration(e.to_string()),
        _ => StorageError::Internal(err.to_string()),
    }
}
