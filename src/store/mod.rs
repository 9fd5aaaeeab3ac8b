// Storage abstraction
// The engine reads externally-owned snapshots and appends immutable facts;
// it works equally over a relational store, a document store, or the
// bundled in-memory implementation.

pub mod memory;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{ChildCounterState, CompletionRecord, LedgerEntry, UnlockedAchievement};

/// Counter movement accompanying one processed event. Streak fields are
/// only written when present.
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    pub tasks_delta: u64,
    pub xp_delta: i64,
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub last_streak_date: Option<NaiveDate>,
}

/// External persistence consumed by the engine.
///
/// Contract for implementors:
/// - `append_ledger_entry` must verify that the entry's `balance_after`
///   extends the child's running sum and reject mismatches with
///   `GamifyError::Integrity`, leaving prior entries unchanged.
/// - `record_unlocked_achievement` must be idempotent per
///   (child, achievement) and report a duplicate by returning false.
/// - Missing children propagate as `GamifyError::NotFound`; defaults are
///   never fabricated.
pub trait GamifyStore: Send + Sync {
    /// Approved completions at or after `since`, in no guaranteed order
    fn completion_history(
        &self,
        child_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletionRecord>>;

    fn child_counters(&self, child_id: &str) -> Result<ChildCounterState>;

    /// Lifetime approved completions in one task category
    fn category_completion_count(&self, child_id: &str, category: &str) -> Result<u64>;

    /// Append one immutable ledger entry and return the updated counter
    /// projection. The append and the counter update are atomic together.
    fn append_ledger_entry(&self, entry: &LedgerEntry) -> Result<ChildCounterState>;

    /// Ledger entries created at or after `since`, in creation order
    fn ledger_entries_since(&self, child_id: &str, since: DateTime<Utc>)
        -> Result<Vec<LedgerEntry>>;

    /// Returns false when the achievement was already unlocked (no-op)
    fn record_unlocked_achievement(
        &self,
        child_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool>;

    fn unlocked_achievements(&self, child_id: &str) -> Result<Vec<UnlockedAchievement>>;

    /// Apply task/XP/streak counter movement for one processed event
    fn apply_progress(&self, child_id: &str, update: &ProgressUpdate)
        -> Result<ChildCounterState>;

    /// Active children of a family, in account creation order
    fn family_children(&self, family_id: &str) -> Result<Vec<String>>;
}
