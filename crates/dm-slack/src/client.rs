//! Slack Web API client for `users.list`.

use async_trait::async_trait;
use dm_model::Roster;
use dm_sync::{RosterSource, SyncResult};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::config::SlackConfig;
use crate::error::{SlackError, SlackResult};
use crate::types::UsersListResponse;

/// Slack's error code for throttled Web API calls.
const RATELIMITED: &str = "ratelimited";

/// Fallback delay when Slack throttles without a `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Fetches workspace rosters from Slack.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http_client: reqwest::Client,
    config: SlackConfig,
}

impl SlackClient {
    /// Creates a new Slack client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SlackConfig) -> SlackResult<Self> {
        if config.page_limit == 0 {
            return Err(SlackError::Config("page_limit must be positive".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SlackError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Fetches every page of `users.list` and normalizes the members.
    ///
    /// Malformed members (no id or no usable name) are dropped. Deleted
    /// members are kept and flagged. Any page failure fails the whole fetch,
    /// so a partial roster is never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched or Slack reports a
    /// failure.
    #[instrument(skip_all)]
    pub async fn users_list(&self, access_token: &str) -> SlackResult<Roster> {
        let mut roster = Roster::default();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.config.max_pages {
            let page = self.users_list_page(access_token, cursor.as_deref()).await?;
            let next = page.next_cursor().map(str::to_string);

            let fetched = page.members.len();
            let before = roster.len();
            roster.extend(page.members.into_iter().filter_map(|m| m.into_roster_entry()));
            let dropped = fetched - (roster.len() - before);
            debug!(page = page_number, fetched, dropped, "Fetched users.list page");

            match next {
                Some(next) => cursor = Some(next),
                None => return Ok(roster),
            }
        }

        Err(SlackError::Pagination(format!(
            "users.list still had more pages after {}",
            self.config.max_pages
        )))
    }

    /// Fetches one page of `users.list`.
    async fn users_list_page(
        &self,
        access_token: &str,
        cursor: Option<&str>,
    ) -> SlackResult<UsersListResponse> {
        let mut query = vec![("limit", self.config.page_limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .http_client
            .get(self.config.users_list_url())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(SlackError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let page: UsersListResponse = response.json().await?;
        if !page.ok {
            return Err(match page.error.as_deref() {
                Some(RATELIMITED) => SlackError::RateLimited {
                    retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
                },
                Some(code) => SlackError::Api(code.to_string()),
                None => SlackError::Api("unknown_error".to_string()),
            });
        }

        Ok(page)
    }
}

#[async_trait]
impl RosterSource for SlackClient {
    fn source_name(&self) -> &'static str {
        "slack"
    }

    async fn fetch_roster(&self, access_token: &str) -> SyncResult<Roster> {
        Ok(self.users_list(access_token).await?)
    }
}
