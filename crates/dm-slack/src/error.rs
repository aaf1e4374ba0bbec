//! Error types for the Slack roster source.

use dm_sync::SyncError;
use thiserror::Error;

/// Result type alias using `SlackError`.
pub type SlackResult<T> = Result<T, SlackError>;

/// Errors that can occur when fetching the Slack roster.
#[derive(Debug, Error)]
pub enum SlackError {
    /// Client configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport or decoding error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack is throttling requests.
    #[error("Rate limited by Slack, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds Slack asked us to wait.
        retry_after_secs: u64,
    },

    /// Slack answered `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),

    /// Non-success HTTP status without a Slack error body.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The cursor chain did not terminate.
    #[error("Pagination error: {0}")]
    Pagination(String),
}

impl SlackError {
    /// Checks if this is a rate limit error.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<SlackError> for SyncError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::RateLimited { retry_after_secs } => Self::RateLimited { retry_after_secs },
            other => Self::upstream(other.to_string()),
        }
    }
}
