// Leaderboard models and time periods

use serde::Serialize;

/// Time period for leaderboard queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl Period {
    pub fn label(&self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::AllTime => "All-time",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "all_time" | "alltime" | "all-time" => Ok(Period::AllTime),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

/// One ranked row of a family leaderboard.
/// Derived and ephemeral: recomputed on demand per period, never persisted
/// as authoritative state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "childId")]
    pub child_id: String,
    pub score: f64,
    /// 1-based position after the descending sort
    pub rank: u32,
    #[serde(rename = "periodPoints")]
    pub period_points: i64,
    #[serde(rename = "periodTasks")]
    pub period_tasks: u64,
    #[serde(rename = "currentStreak")]
    pub current_streak: u32,
    #[serde(rename = "achievementCount")]
    pub achievement_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_period_from_str() {
        assert_eq!(Period::from_str("weekly"), Ok(Period::Weekly));
        assert_eq!(Period::from_str("All-Time"), Ok(Period::AllTime));
        assert!(Period::from_str("fortnightly").is_err());
    }
}
