// Point awards: streak multiplier, milestone spikes, early-completion bonus

use chrono::{DateTime, Duration, Utc};

use crate::config::{
    MILESTONE_POINTS_PER_DAY, STREAK_MILESTONES, STREAK_MULTIPLIER_CAP, STREAK_MULTIPLIER_STEP,
};
use crate::error::{GamifyError, Result};
use crate::models::{BonusCategory, PointsBreakdown};

/// Itemized streak-adjusted award for a single completion
#[derive(Debug, Clone, PartialEq)]
pub struct StreakBonus {
    pub multiplier: f64,
    /// Persisted verbatim on the ledger entry
    pub breakdown: PointsBreakdown,
    pub total_points: i64,
}

/// Streak-scaled award: 5% extra per consecutive day, capped at +150%,
/// plus a one-time milestone spike on the exact day a milestone length
/// is reached (not cumulative).
pub fn calculate_streak_bonus(base_points: i64, streak_days: u32) -> Result<StreakBonus> {
    if base_points < 0 {
        return Err(GamifyError::Validation(format!(
            "base_points must be non-negative, got {}",
            base_points
        )));
    }

    let multiplier =
        (1.0 + streak_days as f64 * STREAK_MULTIPLIER_STEP).min(STREAK_MULTIPLIER_CAP);
    let bonus_points = (base_points as f64 * (multiplier - 1.0)).round() as i64;

    let milestone_bonus = if STREAK_MILESTONES.contains(&streak_days) {
        streak_days as i64 * MILESTONE_POINTS_PER_DAY
    } else {
        0
    };

    let breakdown = PointsBreakdown::new()
        .with(BonusCategory::Base, base_points)
        .with(BonusCategory::Streak, bonus_points)
        .with(BonusCategory::Milestone, milestone_bonus);

    Ok(StreakBonus {
        multiplier,
        total_points: breakdown.total(),
        breakdown,
    })
}

/// Tiered bonus for beating the due date. 0 at or after it; tiers are
/// exclusive, best applicable one only.
pub fn calculate_early_completion_bonus(
    base_points: i64,
    due_date: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> Result<i64> {
    if base_points < 0 {
        return Err(GamifyError::Validation(format!(
            "base_points must be non-negative, got {}",
            base_points
        )));
    }
    if completed_at >= due_date {
        return Ok(0);
    }

    let early = due_date - completed_at;
    let rate = if early >= Duration::hours(48) {
        0.25
    } else if early >= Duration::hours(24) {
        0.15
    } else if early >= Duration::hours(12) {
        0.10
    } else if early >= Duration::hours(6) {
        0.05
    } else {
        0.0
    };

    Ok((base_points as f64 * rate).round() as i64)
}
