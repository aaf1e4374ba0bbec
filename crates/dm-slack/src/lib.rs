//! # dm-slack
//!
//! Slack roster source for the directory mirror.
//!
//! Fetches a workspace's members from the Web API `users.list` method,
//! following pagination cursors, and normalizes each member into a
//! [`RosterEntry`](dm_model::RosterEntry).

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::SlackClient;
pub use config::{SlackConfig, DEFAULT_API_BASE_URL};
pub use error::{SlackError, SlackResult};
