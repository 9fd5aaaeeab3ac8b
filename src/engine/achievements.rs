// Achievement catalog and unlock evaluation

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use tracing::info;

use crate::config::GamifyConfig;
use crate::error::Result;
use crate::models::{
    AchievementDefinition, AchievementTier, BonusCategory, ChildCounterState, LedgerEntry,
    PointsBreakdown, ReferenceType, TransactionType, UnlockCriteria,
};
use crate::store::{GamifyStore, ProgressUpdate};

/// Immutable achievement catalog, loaded once at engine construction
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    defs: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    pub fn new(defs: Vec<AchievementDefinition>) -> Self {
        Self { defs }
    }

    /// The built-in default catalog
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<AchievementDefinition> = serde_json::from_str(json)?;
        Ok(Self::new(defs))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.defs.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

fn def(
    id: &str,
    name: &str,
    criteria: UnlockCriteria,
    tier: AchievementTier,
    points_reward: i64,
    xp_reward: i64,
) -> AchievementDefinition {
    AchievementDefinition {
        id: id.to_string(),
        name: name.to_string(),
        criteria,
        tier,
        points_reward,
        xp_reward,
    }
}

static BUILTIN: Lazy<AchievementCatalog> = Lazy::new(|| {
    use AchievementTier::*;
    use UnlockCriteria::*;

    AchievementCatalog::new(vec![
        def("first_task", "First Task Done", TasksCompleted { count: 1 }, Bronze, 10, 10),
        def("task_10", "Ten Tasks Strong", TasksCompleted { count: 10 }, Bronze, 25, 25),
        def("task_50", "Task Machine", TasksCompleted { count: 50 }, Silver, 75, 75),
        def("task_100", "Century of Chores", TasksCompleted { count: 100 }, Gold, 150, 150),
        def("streak_3", "Three in a Row", StreakDays { days: 3 }, Bronze, 15, 15),
        def("streak_7", "Full Week", StreakDays { days: 7 }, Silver, 50, 50),
        def("streak_30", "Monthly Habit", StreakDays { days: 30 }, Gold, 200, 200),
        def("points_100", "Pocket Money", PointsEarned { points: 100 }, Bronze, 0, 20),
        def("points_500", "Saver", PointsEarned { points: 500 }, Silver, 0, 50),
        def("points_2500", "Treasurer", PointsEarned { points: 2500 }, Gold, 0, 150),
        def(
            "cleaning_master",
            "Cleaning Master",
            CategoryMaster { category: "cleaning".to_string(), count: 20 },
            Silver,
            50,
            50,
        ),
        def(
            "early_bird",
            "Early Bird",
            TimeBased {
                before: chrono::NaiveTime::from_hms_opt(8, 0, 0)
                    .unwrap_or(chrono::NaiveTime::MIN),
                count: 10,
            },
            Silver,
            50,
            50,
        ),
    ])
});

/// Local time of day a completion was approved at
fn local_time_of_day(at: DateTime<Utc>, config: &GamifyConfig) -> chrono::NaiveTime {
    (at + Duration::hours(config.utc_offset_hours as i64)).time()
}

fn criteria_met(
    store: &dyn GamifyStore,
    config: &GamifyConfig,
    counters: &ChildCounterState,
    history: &[crate::models::CompletionRecord],
    criteria: &UnlockCriteria,
) -> Result<bool> {
    match criteria {
        UnlockCriteria::StreakDays { days } => Ok(counters.current_streak_days >= *days),
        UnlockCriteria::TasksCompleted { count } => {
            Ok(counters.total_tasks_completed >= *count)
        }
        UnlockCriteria::PointsEarned { points } => {
            Ok(counters.total_points_earned >= *points)
        }
        UnlockCriteria::CategoryMaster { category, count } => {
            Ok(store.category_completion_count(&counters.child_id, category)? >= *count)
        }
        UnlockCriteria::TimeBased { before, count } => {
            let matching = history
                .iter()
                .filter(|r| local_time_of_day(r.approved_at, config) < *before)
                .count() as u64;
            Ok(matching >= *count)
        }
    }
}

/// Evaluate the whole catalog for one child and unlock anything newly
/// earned. Idempotent: achievements already on record are skipped with no
/// duplicate ledger entries. Returns only the definitions unlocked by this
/// invocation; an empty list is the common result.
///
/// Callers must hold the child's write lock (the orchestrator does); the
/// unlock path appends to the ledger.
pub fn check_achievements(
    store: &dyn GamifyStore,
    catalog: &AchievementCatalog,
    config: &GamifyConfig,
    child_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<AchievementDefinition>> {
    let counters = store.child_counters(child_id)?;

    // One history fetch covers every time-based criteria in the catalog
    let history = if catalog
        .iter()
        .any(|d| matches!(d.criteria, UnlockCriteria::TimeBased { .. }))
    {
        store.completion_history(child_id, DateTime::UNIX_EPOCH)?
    } else {
        Vec::new()
    };

    let mut newly_unlocked = Vec::new();
    for definition in catalog.iter() {
        if !criteria_met(store, config, &counters, &history, &definition.criteria)? {
            continue;
        }
        // false means it was already unlocked: skip silently
        if !store.record_unlocked_achievement(child_id, &definition.id, now)? {
            continue;
        }

        info!(child_id, achievement = %definition.id, "achievement unlocked");

        if definition.points_reward > 0 {
            let balance = store.child_counters(child_id)?.total_points_earned;
            let entry = LedgerEntry {
                child_id: child_id.to_string(),
                transaction_type: TransactionType::Bonus,
                points_amount: definition.points_reward,
                balance_after: balance + definition.points_reward,
                breakdown: PointsBreakdown::new()
                    .with(BonusCategory::Achievement, definition.points_reward),
                reference_type: ReferenceType::AchievementUnlock,
                reference_id: definition.id.clone(),
                created_at: now,
            };
            store.append_ledger_entry(&entry)?;
        }
        if definition.xp_reward > 0 {
            store.apply_progress(
                child_id,
                &ProgressUpdate {
                    xp_delta: definition.xp_reward,
                    ..Default::default()
                },
            )?;
        }

        newly_unlocked.push(definition.clone());
    }

    Ok(newly_unlocked)
}
