//! # dm-model
//!
//! Domain models for the directory mirror.
//!
//! - [`DirectoryKey`] - the `(external_id, display_name)` identity pair
//! - [`DirectoryEntry`] - a persisted mirror row
//! - [`RosterEntry`] / [`Roster`] - a normalized snapshot of the external directory

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod entry;
pub mod roster;

pub use entry::{DirectoryEntry, DirectoryKey, KeySet};
pub use roster::{Roster, RosterEntry};
