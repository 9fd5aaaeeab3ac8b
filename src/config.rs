// Engine configuration and model constants

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{GamifyError, Result};

/// XP required to clear level 1; higher levels scale by the growth factor
pub const BASE_XP: f64 = 100.0;

/// Exponent of the level curve: level N costs floor(BASE_XP * N^1.5)
pub const GROWTH_FACTOR: f64 = 1.5;

/// Levels stop advancing here; surplus XP is retained
pub const MAX_LEVEL: u32 = 100;

/// Streak multiplier gain per consecutive day
pub const STREAK_MULTIPLIER_STEP: f64 = 0.05;

/// Streak multiplier ceiling (+150%)
pub const STREAK_MULTIPLIER_CAP: f64 = 2.5;

/// Streak lengths that pay a one-time milestone bonus on the exact day
pub const STREAK_MILESTONES: [u32; 6] = [3, 7, 14, 30, 60, 100];

/// Milestone bonus is the streak length times this
pub const MILESTONE_POINTS_PER_DAY: i64 = 5;

/// Upper bound for the configurable grace period
pub const MAX_GRACE_PERIOD_HOURS: u32 = 12;

/// Trailing window of completion history consulted for live streaks
pub const STREAK_HISTORY_DAYS: i64 = 90;

/// Weights of the leaderboard composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub points: f64,
    pub tasks: f64,
    pub streak: f64,
    pub achievements: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            points: 1.0,
            tasks: 5.0,
            streak: 2.0,
            achievements: 10.0,
        }
    }
}

/// Per-family engine configuration.
///
/// `grace_period_hours` shifts the streak-day boundary past local midnight:
/// with the default of 4, a completion at 1:30 AM still counts toward the
/// previous day. `utc_offset_hours` is the family's local offset; timestamps
/// are converted to local time before the grace period is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamifyConfig {
    pub grace_period_hours: u32,
    pub minimum_tasks_per_day: u32,
    pub utc_offset_hours: i32,
    pub week_starts_on: Weekday,
    pub weights: ScoreWeights,
}

impl Default for GamifyConfig {
    fn default() -> Self {
        Self {
            grace_period_hours: 4,
            minimum_tasks_per_day: 1,
            utc_offset_hours: 0,
            week_starts_on: Weekday::Sun,
            weights: ScoreWeights::default(),
        }
    }
}

impl GamifyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grace_period_hours > MAX_GRACE_PERIOD_HOURS {
            return Err(GamifyError::Validation(format!(
                "grace_period_hours must be 0..={}, got {}",
                MAX_GRACE_PERIOD_HOURS, self.grace_period_hours
            )));
        }
        if self.minimum_tasks_per_day == 0 {
            return Err(GamifyError::Validation(
                "minimum_tasks_per_day must be at least 1".to_string(),
            ));
        }
        if self.utc_offset_hours < -12 || self.utc_offset_hours > 14 {
            return Err(GamifyError::Validation(format!(
                "utc_offset_hours must be -12..=14, got {}",
                self.utc_offset_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GamifyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_grace_period_bounds() {
        let mut config = GamifyConfig::default();
        config.grace_period_hours = 12;
        assert!(config.validate().is_ok());
        config.grace_period_hours = 13;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimum_tasks_must_be_positive() {
        let mut config = GamifyConfig::default();
        config.minimum_tasks_per_day = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let mut config = GamifyConfig::default();
        config.utc_offset_hours = 9;
        config.week_starts_on = chrono::Weekday::Mon;
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GamifyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
