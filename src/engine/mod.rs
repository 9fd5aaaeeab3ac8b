// Gamification engine
// One entry point per approval event, orchestrating the XP, points,
// streak, and achievement models under a per-child lock.

pub mod achievements;
pub mod leaderboard;
pub mod points;
pub mod streak;
pub mod xp;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{info, warn};

use crate::config::{GamifyConfig, STREAK_HISTORY_DAYS};
use crate::error::{GamifyError, Result};
use crate::models::{
    AchievementDefinition, BonusCategory, ChildCounterState, LeaderboardEntry, LedgerEntry,
    Period, ReferenceType, TaskInput, TransactionType,
};
use crate::store::{GamifyStore, ProgressUpdate};

pub use achievements::AchievementCatalog;
pub use points::StreakBonus;
pub use streak::StreakStatus;
pub use xp::LevelInfo;

/// Everything awarded by one approval event
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// Task points including streak, milestone, and earliness bonuses.
    /// Achievement payouts are itemized separately.
    pub points_awarded: i64,
    pub xp_awarded: i64,
    /// Balance after this event, including any achievement payouts
    pub new_balance: i64,
    pub leveled_up: bool,
    pub new_level: Option<u32>,
    pub unlocked_achievements: Vec<AchievementDefinition>,
    pub streak: StreakStatus,
}

/// The deterministic rules engine converting approval events into points,
/// XP, streaks, achievements, and rankings.
///
/// Writes for the same child are serialized through a per-child mutex;
/// events for different children proceed in parallel. All computation
/// below this type is pure; the only side effects are the ledger append,
/// the counter update, and the achievement unlock, all delegated to the
/// store.
pub struct GamificationEngine {
    store: Arc<dyn GamifyStore>,
    config: GamifyConfig,
    catalog: AchievementCatalog,
    child_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GamificationEngine {
    pub fn new(
        store: Arc<dyn GamifyStore>,
        config: GamifyConfig,
        catalog: AchievementCatalog,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            catalog,
            child_locks: DashMap::new(),
        })
    }

    pub fn config(&self) -> &GamifyConfig {
        &self.config
    }

    fn child_lock(&self, child_id: &str) -> Arc<Mutex<()>> {
        self.child_locks
            .entry(child_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Process one approved task for one child.
    ///
    /// Contract: the caller has already persisted the approved
    /// `CompletionRecord`, so the history snapshot read here includes it.
    /// The whole event either completes or fails without the engine
    /// having partially mutated anything it owns; rollback of a failed
    /// store append belongs to the caller's transaction boundary.
    pub fn on_task_approved(
        &self,
        child_id: &str,
        task: &TaskInput,
        completed_at: DateTime<Utc>,
    ) -> Result<ApprovalOutcome> {
        if task.base_points < 0 {
            return Err(GamifyError::Validation(format!(
                "base_points must be non-negative, got {}",
                task.base_points
            )));
        }

        let lock = self.child_lock(child_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = self.store.child_counters(child_id)?;

        // Streak first: the bonus multiplier uses the streak as of this
        // completion
        let since = completed_at - Duration::days(STREAK_HISTORY_DAYS);
        let history = self.store.completion_history(child_id, since)?;
        let streak_status = streak::calculate_streak(&history, completed_at, &self.config);

        // Itemized points: base + streak + milestone + earliness
        let bonus = points::calculate_streak_bonus(task.base_points, streak_status.current_streak)?;
        let mut breakdown = bonus.breakdown.clone();
        if let Some(due) = task.due_date {
            let early = points::calculate_early_completion_bonus(task.base_points, due, completed_at)?;
            breakdown.set(BonusCategory::Early, early);
        }
        let points_awarded = breakdown.total();

        let entry = LedgerEntry {
            child_id: child_id.to_string(),
            transaction_type: TransactionType::Earned,
            points_amount: points_awarded,
            balance_after: before.total_points_earned + points_awarded,
            breakdown,
            reference_type: ReferenceType::TaskCompletion,
            reference_id: task.task_id.clone(),
            created_at: completed_at,
        };
        self.store.append_ledger_entry(&entry)?;

        // XP movement; the level is judged only after achievements settle
        let xp_awarded = xp::calculate_task_xp(task.difficulty, task.due_date, completed_at);
        let old_level = xp::level_from_xp(before.total_xp)?;
        self.store.apply_progress(
            child_id,
            &ProgressUpdate {
                tasks_delta: 1,
                xp_delta: xp_awarded,
                current_streak: Some(streak_status.current_streak),
                longest_streak: Some(streak_status.longest_streak),
                last_streak_date: Some(streak::streak_day(completed_at, &self.config)),
            },
        )?;

        let unlocked = achievements::check_achievements(
            self.store.as_ref(),
            &self.catalog,
            &self.config,
            child_id,
            completed_at,
        )?;

        // Achievement payouts may have moved the balance and XP again;
        // the outcome reports the state the event actually left behind
        let final_counters = self.store.child_counters(child_id)?;
        let new_level = xp::level_from_xp(final_counters.total_xp)?;
        let leveled_up = new_level.level > old_level.level;

        info!(
            child_id,
            points = points_awarded,
            xp = xp_awarded,
            streak = streak_status.current_streak,
            unlocked = unlocked.len(),
            "task approval processed"
        );

        Ok(ApprovalOutcome {
            points_awarded,
            xp_awarded,
            new_balance: final_counters.total_points_earned,
            leveled_up,
            new_level: if leveled_up { Some(new_level.level) } else { None },
            unlocked_achievements: unlocked,
            streak: streak_status,
        })
    }

    /// Live streak standing for one child, computed as of now
    pub fn get_streak_status(&self, child_id: &str) -> Result<StreakStatus> {
        self.streak_status_at(child_id, Utc::now())
    }

    pub fn streak_status_at(&self, child_id: &str, now: DateTime<Utc>) -> Result<StreakStatus> {
        let since = now - Duration::days(STREAK_HISTORY_DAYS);
        let history = self.store.completion_history(child_id, since)?;
        Ok(streak::calculate_streak(&history, now, &self.config))
    }

    /// Ranked leaderboard for a family and period, computed as of now
    pub fn get_leaderboard(&self, family_id: &str, period: Period) -> Result<Vec<LeaderboardEntry>> {
        self.leaderboard_at(family_id, period, Utc::now())
    }

    pub fn leaderboard_at(
        &self,
        family_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        leaderboard::family_leaderboard(self.store.as_ref(), &self.config, family_id, period, now)
    }

    /// Rebuild the counter projection from the ledger and completion
    /// history. The ledger is the source of truth; the cached counters are
    /// only a read optimization, and this recomputation must always be
    /// possible. Logs a warning when the cache had drifted. Returns the
    /// recomputed state without writing it; correcting the store is the
    /// caller's decision.
    pub fn reconcile_counters(&self, child_id: &str) -> Result<ChildCounterState> {
        let cached = self.store.child_counters(child_id)?;

        let ledger = self
            .store
            .ledger_entries_since(child_id, DateTime::UNIX_EPOCH)?;
        let total_points_earned = ledger.last().map(|e| e.balance_after).unwrap_or(0);

        let history = self
            .store
            .completion_history(child_id, DateTime::UNIX_EPOCH)?;
        let total_tasks_completed = history.len() as u64;

        let task_xp: i64 = history
            .iter()
            .map(|r| xp::calculate_task_xp(r.task_difficulty, r.due_date, r.approved_at))
            .sum();
        let achievement_xp: i64 = self
            .store
            .unlocked_achievements(child_id)?
            .iter()
            .filter_map(|u| self.catalog.get(&u.achievement_id))
            .map(|d| d.xp_reward)
            .sum();

        let now = Utc::now();
        let streak_status = streak::calculate_streak(&history, now, &self.config);

        let rebuilt = ChildCounterState {
            child_id: child_id.to_string(),
            total_points_earned,
            total_tasks_completed,
            total_xp: task_xp + achievement_xp,
            current_streak_days: streak_status.current_streak,
            longest_streak_days: streak_status.longest_streak.max(cached.longest_streak_days),
            last_streak_date: history
                .last()
                .map(|r| streak::streak_day(r.approved_at, &self.config)),
        };

        if rebuilt.total_points_earned != cached.total_points_earned
            || rebuilt.total_tasks_completed != cached.total_tasks_completed
            || rebuilt.total_xp != cached.total_xp
        {
            warn!(
                child_id,
                cached_points = cached.total_points_earned,
                rebuilt_points = rebuilt.total_points_earned,
                cached_tasks = cached.total_tasks_completed,
                rebuilt_tasks = rebuilt.total_tasks_completed,
                "counter projection drifted from ledger"
            );
        }

        Ok(rebuilt)
    }
}
