// Achievement data model

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Unlock condition, one variant per criteria kind.
///
/// A tagged enum rather than a string-dispatched criteria type, so that a
/// new kind of criteria cannot be added without every evaluation site
/// being updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnlockCriteria {
    /// Current streak reaches the given length
    StreakDays { days: u32 },
    /// Lifetime approved completions reach the given count
    TasksCompleted { count: u64 },
    /// Lifetime earned points reach the given total
    PointsEarned { points: i64 },
    /// Approved completions in one category reach the given count
    CategoryMaster { category: String, count: u64 },
    /// Completions before a local time-of-day cutoff reach the given count
    TimeBased { before: NaiveTime, count: u64 },
}

/// Display tier of an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// One entry of the immutable achievement catalog, loaded once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub name: String,
    pub criteria: UnlockCriteria,
    pub tier: AchievementTier,
    #[serde(rename = "pointsReward")]
    pub points_reward: i64,
    #[serde(rename = "xpReward")]
    pub xp_reward: i64,
}

/// Record of a child having unlocked an achievement.
/// At most one exists per (child, achievement); unlocking is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    #[serde(rename = "childId")]
    pub child_id: String,
    #[serde(rename = "achievementId")]
    pub achievement_id: String,
    #[serde(rename = "unlockedAt")]
    pub unlocked_at: DateTime<Utc>,
}
