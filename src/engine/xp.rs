// XP curve and level progression

use chrono::{DateTime, Duration, Utc};

use crate::config::{BASE_XP, GROWTH_FACTOR, MAX_LEVEL};
use crate::error::{GamifyError, Result};
use crate::models::TaskDifficulty;

/// Level standing derived from total XP
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    pub level: u32,
    /// XP accumulated inside the current level
    pub current_xp: i64,
    /// Full cost of the current level
    pub xp_to_next: i64,
    /// 0..=100
    pub progress_percent: u32,
}

/// XP needed to clear `level`: floor(BASE_XP * level^1.5). 0 for level <= 0.
pub fn xp_required_for_level(level: i32) -> i64 {
    if level <= 0 {
        return 0;
    }
    (BASE_XP * (level as f64).powf(GROWTH_FACTOR)).floor() as i64
}

/// Total XP at which `level` is first reached (levels 1..level-1 cleared)
pub fn cumulative_xp_for_level(level: i32) -> i64 {
    (1..level).map(xp_required_for_level).sum()
}

/// Walk the level curve: subtract each level's requirement from the
/// remainder while it is covered. Levels stop at MAX_LEVEL; XP beyond the
/// cap is retained but progress is pinned at 100%.
pub fn level_from_xp(total_xp: i64) -> Result<LevelInfo> {
    if total_xp < 0 {
        return Err(GamifyError::Validation(format!(
            "total_xp must be non-negative, got {}",
            total_xp
        )));
    }

    let mut level: u32 = 1;
    let mut remainder = total_xp;
    while remainder >= xp_required_for_level(level as i32) && level < MAX_LEVEL {
        remainder -= xp_required_for_level(level as i32);
        level += 1;
    }

    let xp_to_next = xp_required_for_level(level as i32);
    let progress_percent =
        (((remainder as f64 / xp_to_next as f64) * 100.0).round() as u32).min(100);

    Ok(LevelInfo {
        level,
        current_xp: remainder,
        xp_to_next,
        progress_percent,
    })
}

/// XP award for one approved task: a difficulty base, scaled up when the
/// task beat its due date. Bonus tiers are exclusive; the highest
/// applicable one wins.
pub fn calculate_task_xp(
    difficulty: Option<TaskDifficulty>,
    due_date: Option<DateTime<Utc>>,
    completed_at: DateTime<Utc>,
) -> i64 {
    let base: f64 = match difficulty {
        Some(TaskDifficulty::Easy) => 10.0,
        Some(TaskDifficulty::Medium) => 20.0,
        Some(TaskDifficulty::Hard) => 35.0,
        None => 15.0,
    };

    let multiplier = match due_date {
        Some(due) if completed_at < due => {
            let early = due - completed_at;
            if early > Duration::hours(24) {
                1.25
            } else if early > Duration::hours(6) {
                1.10
            } else {
                1.0
            }
        }
        _ => 1.0,
    };

    (base * multiplier).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_xp_required_curve() {
        assert_eq!(xp_required_for_level(0), 0);
        assert_eq!(xp_required_for_level(-3), 0);
        assert_eq!(xp_required_for_level(1), 100);
        // floor(100 * 2^1.5) = floor(282.84)
        assert_eq!(xp_required_for_level(2), 282);
        // floor(100 * 3^1.5) = floor(519.61)
        assert_eq!(xp_required_for_level(3), 519);
    }

    #[test]
    fn test_cumulative_xp_round_trip() {
        for level in 1..=30 {
            let info = level_from_xp(cumulative_xp_for_level(level)).unwrap();
            assert_eq!(info.level, level as u32);
            assert_eq!(info.current_xp, 0);
        }
    }

    #[test]
    fn test_level_from_zero_xp() {
        let info = level_from_xp(0).unwrap();
        assert_eq!(info.level, 1);
        assert_eq!(info.current_xp, 0);
        assert_eq!(info.xp_to_next, 100);
        assert_eq!(info.progress_percent, 0);
    }

    #[test]
    fn test_level_progress_mid_level() {
        // 150 XP: level 1 (100) cleared, 50 into level 2 (282)
        let info = level_from_xp(150).unwrap();
        assert_eq!(info.level, 2);
        assert_eq!(info.current_xp, 50);
        assert_eq!(info.xp_to_next, 282);
        assert_eq!(info.progress_percent, 18);
    }

    #[test]
    fn test_max_level_retains_surplus() {
        let at_cap = cumulative_xp_for_level(MAX_LEVEL as i32);
        let info = level_from_xp(at_cap + 500).unwrap();
        assert_eq!(info.level, MAX_LEVEL);
        assert_eq!(info.current_xp, 500);

        let far_beyond = level_from_xp(at_cap + 10 * xp_required_for_level(MAX_LEVEL as i32))
            .unwrap();
        assert_eq!(far_beyond.level, MAX_LEVEL);
        assert_eq!(far_beyond.progress_percent, 100);
    }

    #[test]
    fn test_negative_xp_rejected() {
        assert!(level_from_xp(-1).is_err());
    }

    #[test]
    fn test_task_xp_difficulty_bases() {
        let now = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(calculate_task_xp(Some(TaskDifficulty::Easy), None, now), 10);
        assert_eq!(calculate_task_xp(Some(TaskDifficulty::Medium), None, now), 20);
        assert_eq!(calculate_task_xp(Some(TaskDifficulty::Hard), None, now), 35);
        assert_eq!(calculate_task_xp(None, None, now), 15);
    }

    #[test]
    fn test_task_xp_earliness_tiers() {
        let completed = chrono::Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        // 25h early: x1.25, 35 * 1.25 = 43.75 -> 44
        let due = completed + Duration::hours(25);
        assert_eq!(
            calculate_task_xp(Some(TaskDifficulty::Hard), Some(due), completed),
            44
        );

        // 7h early: x1.10
        let due = completed + Duration::hours(7);
        assert_eq!(
            calculate_task_xp(Some(TaskDifficulty::Medium), Some(due), completed),
            22
        );

        // 2h early: no bonus
        let due = completed + Duration::hours(2);
        assert_eq!(
            calculate_task_xp(Some(TaskDifficulty::Medium), Some(due), completed),
            20
        );

        // Completed late: no bonus
        let due = completed - Duration::hours(1);
        assert_eq!(
            calculate_task_xp(Some(TaskDifficulty::Hard), Some(due), completed),
            35
        );
    }
}
