//! Slack client configuration.

use std::time::Duration;

/// Default Slack Web API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Configuration for [`SlackClient`](crate::SlackClient).
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Web API base URL, without trailing slash.
    pub api_base_url: String,
    /// Members requested per `users.list` page.
    pub page_limit: u32,
    /// Upper bound on pages followed for one roster.
    pub max_pages: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_limit: 200,
            max_pages: 500,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SlackConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Sets the maximum number of pages.
    #[must_use]
    pub const fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the `users.list` endpoint URL.
    #[must_use]
    pub fn users_list_url(&self) -> String {
        format!("{}/users.list", self.api_base_url)
    }
}
