// Per-child progress counters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-optimized projection of a child's progress.
///
/// Derived entirely from the ledger and the completion history: the ledger
/// is the source of truth for `total_points_earned`, and the whole struct
/// can be rebuilt from scratch at any time (see
/// `GamificationEngine::reconcile_counters`). Mutated only once per
/// processed approval event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildCounterState {
    #[serde(rename = "childId")]
    pub child_id: String,
    #[serde(rename = "totalPointsEarned")]
    pub total_points_earned: i64,
    #[serde(rename = "totalTasksCompleted")]
    pub total_tasks_completed: u64,
    #[serde(rename = "totalXp")]
    pub total_xp: i64,
    #[serde(rename = "currentStreakDays")]
    pub current_streak_days: u32,
    #[serde(rename = "longestStreakDays")]
    pub longest_streak_days: u32,
    #[serde(rename = "lastStreakDate")]
    pub last_streak_date: Option<NaiveDate>,
}

impl ChildCounterState {
    pub fn new(child_id: &str) -> Self {
        Self {
            child_id: child_id.to_string(),
            ..Default::default()
        }
    }
}
