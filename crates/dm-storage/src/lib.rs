//! # dm-storage
//!
//! `PostgreSQL` storage for the directory mirror, built on `SQLx`.
//!
//! - [`pool`] - connection pool, migrations and health ping
//! - [`session`] - explicit transaction handles injected into every query
//! - [`directory`] - live-key lookup, touch upsert, prune and delete-by-key

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod directory;
pub mod entities;
pub mod error;
pub mod pool;
pub mod session;

pub use directory::UpsertCounts;
pub use error::{StorageError, StorageResult};
pub use pool::{create_pool, ping, run_migrations, PoolConfig, MIGRATOR};
pub use session::DirectorySession;
