// Streak derivation from approved-completion history
//
// Streaks are never persisted transition-by-transition; they are
// recomputed on demand from whatever history window the caller supplies.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::GamifyConfig;
use crate::models::CompletionRecord;

/// Current streak standing for one child
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakStatus {
    pub current_streak: u32,
    /// Longest run within the supplied history window
    pub longest_streak: u32,
    /// True when the streak will break unless something is completed
    /// before today's grace cutoff
    pub streak_at_risk: bool,
    pub completed_today: u32,
    pub required_daily: u32,
}

/// Map a completion instant to the streak day it credits.
///
/// The timestamp is converted to family local time, then the grace period
/// is subtracted, then the calendar date is taken. With a 4h grace period
/// a completion at 1:30 AM on day D credits day D-1, while 5:00 AM
/// credits D itself.
pub fn streak_day(ts: DateTime<Utc>, config: &GamifyConfig) -> NaiveDate {
    let local = ts + Duration::hours(config.utc_offset_hours as i64);
    (local - Duration::hours(config.grace_period_hours as i64)).date_naive()
}

/// Derive the current streak by walking backward from today's streak day.
///
/// Today with no qualifying completion yet is skipped rather than treated
/// as a break: the streak only ends once an entire day was missed. A child
/// with no history has streak 0 until the first qualifying completion.
pub fn calculate_streak(
    completions: &[CompletionRecord],
    now: DateTime<Utc>,
    config: &GamifyConfig,
) -> StreakStatus {
    let required = config.minimum_tasks_per_day.max(1);

    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for completion in completions {
        *per_day
            .entry(streak_day(completion.approved_at, config))
            .or_insert(0) += 1;
    }

    let today = streak_day(now, config);
    let completed_today = per_day.get(&today).copied().unwrap_or(0);

    let mut check_day = if completed_today >= required {
        today
    } else {
        today - Duration::days(1)
    };

    let mut current = 0u32;
    while per_day.get(&check_day).copied().unwrap_or(0) >= required {
        current += 1;
        check_day -= Duration::days(1);
    }

    let longest = longest_streak(&per_day, required).max(current);

    StreakStatus {
        current_streak: current,
        longest_streak: longest,
        streak_at_risk: current > 0 && completed_today < required,
        completed_today,
        required_daily: required,
    }
}

/// Longest run of consecutive qualifying days in the window
fn longest_streak(per_day: &HashMap<NaiveDate, u32>, required: u32) -> u32 {
    let mut days: Vec<NaiveDate> = per_day
        .iter()
        .filter(|(_, &count)| count >= required)
        .map(|(&day, _)| day)
        .collect();
    if days.is_empty() {
        return 0;
    }
    days.sort();

    let mut longest = 1u32;
    let mut run = 1u32;
    for i in 1..days.len() {
        if days[i] == days[i - 1] + Duration::days(1) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}
