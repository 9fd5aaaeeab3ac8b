// In-memory store
// Backs the test suite and small single-process deployments. Collections
// are DashMap tables keyed by child id, mirroring how a document store
// would shard the same data.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::error::{GamifyError, Result};
use crate::models::{ChildCounterState, CompletionRecord, LedgerEntry, UnlockedAchievement};
use crate::store::{GamifyStore, ProgressUpdate};

#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: DashMap<String, ChildCounterState>,
    ledgers: DashMap<String, Vec<LedgerEntry>>,
    completions: DashMap<String, Vec<CompletionRecord>>,
    unlocked: DashMap<String, Vec<UnlockedAchievement>>,
    families: DashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a child under a family. Insertion order doubles as
    /// account creation order.
    pub fn add_child(&self, family_id: &str, child_id: &str) {
        self.counters
            .entry(child_id.to_string())
            .or_insert_with(|| ChildCounterState::new(child_id));
        let mut roster = self.families.entry(family_id.to_string()).or_default();
        if !roster.iter().any(|id| id == child_id) {
            roster.push(child_id.to_string());
        }
    }

    /// Persist an approved completion. In production this is owned by the
    /// task-approval workflow; callers must do it before invoking
    /// `on_task_approved`.
    pub fn record_completion(&self, record: CompletionRecord) {
        self.completions
            .entry(record.child_id.clone())
            .or_default()
            .push(record);
    }

    fn require_child(&self, child_id: &str) -> Result<()> {
        if self.counters.contains_key(child_id) {
            Ok(())
        } else {
            Err(GamifyError::NotFound(format!("child {}", child_id)))
        }
    }
}

impl GamifyStore for MemoryStore {
    fn completion_history(
        &self,
        child_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CompletionRecord>> {
        self.require_child(child_id)?;
        let mut history: Vec<CompletionRecord> = self
            .completions
            .get(child_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.approved_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Callers may not assume storage order
        history.sort_by_key(|r| r.approved_at);
        Ok(history)
    }

    fn child_counters(&self, child_id: &str) -> Result<ChildCounterState> {
        self.counters
            .get(child_id)
            .map(|c| c.clone())
            .ok_or_else(|| GamifyError::NotFound(format!("child {}", child_id)))
    }

    fn category_completion_count(&self, child_id: &str, category: &str) -> Result<u64> {
        self.require_child(child_id)?;
        Ok(self
            .completions
            .get(child_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.task_category == category)
                    .count() as u64
            })
            .unwrap_or(0))
    }

    fn append_ledger_entry(&self, entry: &LedgerEntry) -> Result<ChildCounterState> {
        self.require_child(&entry.child_id)?;
        if entry.points_amount != entry.breakdown.total() {
            return Err(GamifyError::Validation(format!(
                "points_amount {} does not match breakdown total {}",
                entry.points_amount,
                entry.breakdown.total()
            )));
        }

        let mut ledger = self.ledgers.entry(entry.child_id.clone()).or_default();
        let prior = ledger.last().map(|e| e.balance_after).unwrap_or(0);
        let expected = prior + entry.points_amount;
        if entry.balance_after != expected {
            return Err(GamifyError::Integrity {
                child_id: entry.child_id.clone(),
                expected,
                declared: entry.balance_after,
            });
        }
        if expected < 0 {
            return Err(GamifyError::Validation(format!(
                "balance for child {} would go negative ({})",
                entry.child_id, expected
            )));
        }
        ledger.push(entry.clone());
        debug!(
            child_id = %entry.child_id,
            amount = entry.points_amount,
            balance = expected,
            "ledger entry appended"
        );

        let mut counters = self
            .counters
            .get_mut(&entry.child_id)
            .ok_or_else(|| GamifyError::NotFound(format!("child {}", entry.child_id)))?;
        counters.total_points_earned = expected;
        Ok(counters.clone())
    }

    fn ledger_entries_since(
        &self,
        child_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        self.require_child(child_id)?;
        Ok(self
            .ledgers
            .get(child_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.created_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn record_unlocked_achievement(
        &self,
        child_id: &str,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.require_child(child_id)?;
        let mut unlocked = self.unlocked.entry(child_id.to_string()).or_default();
        if unlocked.iter().any(|u| u.achievement_id == achievement_id) {
            return Ok(false);
        }
        unlocked.push(UnlockedAchievement {
            child_id: child_id.to_string(),
            achievement_id: achievement_id.to_string(),
            unlocked_at,
        });
        Ok(true)
    }

    fn unlocked_achievements(&self, child_id: &str) -> Result<Vec<UnlockedAchievement>> {
        self.require_child(child_id)?;
        Ok(self
            .unlocked
            .get(child_id)
            .map(|u| u.clone())
            .unwrap_or_default())
    }

    fn apply_progress(
        &self,
        child_id: &str,
        update: &ProgressUpdate,
    ) -> Result<ChildCounterState> {
        let mut counters = self
            .counters
            .get_mut(child_id)
            .ok_or_else(|| GamifyError::NotFound(format!("child {}", child_id)))?;
        counters.total_tasks_completed += update.tasks_delta;
        counters.total_xp += update.xp_delta;
        if let Some(current) = update.current_streak {
            counters.current_streak_days = current;
        }
        if let Some(longest) = update.longest_streak {
            counters.longest_streak_days = counters.longest_streak_days.max(longest);
        }
        if let Some(date) = update.last_streak_date {
            counters.last_streak_date = Some(date);
        }
        Ok(counters.clone())
    }

    fn family_children(&self, family_id: &str) -> Result<Vec<String>> {
        self.families
            .get(family_id)
            .map(|roster| roster.clone())
            .ok_or_else(|| GamifyError::NotFound(format!("family {}", family_id)))
    }
}
