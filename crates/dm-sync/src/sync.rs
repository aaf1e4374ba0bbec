//! Sync strategies and pass reports.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dm_model::KeySet;
use serde::{Deserialize, Serialize};

// ============================================================================
// Prune Strategy
// ============================================================================

/// How a reconciliation pass decides which rows to remove.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneStrategy {
    /// Touch every roster key with the pass timestamp, then delete rows
    /// whose `updated_at` is older than it.
    #[default]
    Timestamp,

    /// Read the live key set, touch every roster key, then delete the keys
    /// that were live but absent from the roster.
    KeyDiff,
}

impl PruneStrategy {
    /// Returns the configuration name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::KeyDiff => "key_diff",
        }
    }
}

impl fmt::Display for PruneStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PruneStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(Self::Timestamp),
            "key_diff" | "keydiff" | "diff" => Ok(Self::KeyDiff),
            other => Err(format!("unknown prune strategy '{other}'")),
        }
    }
}

// ============================================================================
// Sync Report
// ============================================================================

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Rows inserted for keys seen for the first time.
    pub added: u64,

    /// Existing rows whose `updated_at` was refreshed.
    pub updated: u64,

    /// Rows deleted because their key was absent from the roster.
    pub removed: u64,

    /// Strategy used for the pass.
    pub strategy: PruneStrategy,

    /// When the pass started.
    pub started_at: DateTime<Utc>,

    /// When the pass completed.
    pub completed_at: DateTime<Utc>,

    /// Status message.
    pub status: String,
}

impl SyncReport {
    /// Creates an empty report for a pass starting now.
    #[must_use]
    pub fn new(strategy: PruneStrategy, started_at: DateTime<Utc>) -> Self {
        Self {
            added: 0,
            updated: 0,
            removed: 0,
            strategy,
            started_at,
            completed_at: started_at,
            status: String::new(),
        }
    }

    /// Marks the pass as complete.
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        self.status = format!(
            "Sync completed: {} added, {} updated, {} removed",
            self.added, self.updated, self.removed
        );
        self
    }

    /// Returns the number of rows the pass wrote or deleted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.added + self.updated + self.removed
    }

    /// Returns true if the pass inserted or deleted anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// The converged state after a successful pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Live key set re-read after the pass.
    pub live: KeySet,

    /// Pass counters.
    pub report: SyncReport,
}
