//! `users.list` wire types and member normalization.

use dm_model::RosterEntry;
use serde::Deserialize;

/// Response body of `users.list`.
#[derive(Debug, Deserialize)]
pub struct UsersListResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

impl UsersListResponse {
    /// Returns the cursor of the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()
            .map(|m| m.next_cursor.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// Pagination metadata.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

/// A workspace member as returned by Slack.
#[derive(Debug, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Member profile fields used for naming.
#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub real_name: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Member {
    /// Returns the name mirrored for this member.
    ///
    /// Prefers `real_name`, then `profile.real_name`, then the handle.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.real_name.as_deref())
            .or_else(|| non_empty(self.profile.as_ref().and_then(|p| p.real_name.as_deref())))
            .or_else(|| non_empty(self.name.as_deref()))
    }

    /// Normalizes the member, or returns `None` if it lacks an id or a name.
    #[must_use]
    pub fn into_roster_entry(self) -> Option<RosterEntry> {
        let id = non_empty(self.id.as_deref())?.to_string();
        let name = self.display_name()?.to_string();
        let entry = RosterEntry::new(id, name);
        Some(if self.deleted { entry.deleted() } else { entry })
    }
}
