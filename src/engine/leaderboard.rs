// Family leaderboard: period aggregation and composite ranking

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::GamifyConfig;
use crate::error::Result;
use crate::models::{LeaderboardEntry, Period, TransactionType};
use crate::store::GamifyStore;

/// UTC instant of local midnight on `date` for the family's offset
fn local_midnight_utc(date: NaiveDate, config: &GamifyConfig) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) - Duration::hours(config.utc_offset_hours as i64);
    Utc.from_utc_datetime(&naive)
}

/// Start instant of a ranking period.
///
/// Daily is local midnight today; weekly backs up to the configured week
/// start (Sunday by default); monthly is the first of the local month;
/// all-time is the Unix epoch.
pub fn period_start(period: Period, now: DateTime<Utc>, config: &GamifyConfig) -> DateTime<Utc> {
    let local_today = (now + Duration::hours(config.utc_offset_hours as i64)).date_naive();
    match period {
        Period::Daily => local_midnight_utc(local_today, config),
        Period::Weekly => {
            let mut day = local_today;
            while day.weekday() != config.week_starts_on {
                day -= Duration::days(1);
            }
            local_midnight_utc(day, config)
        }
        Period::Monthly => {
            let first = local_today.with_day(1).unwrap_or(local_today);
            local_midnight_utc(first, config)
        }
        Period::AllTime => DateTime::UNIX_EPOCH,
    }
}

/// Rank every child of a family for the period.
///
/// Aggregates `earned`-type ledger points and approved completions within
/// the range plus the child's live streak and achievement count, weighs
/// them into a composite score, and sorts descending. Ties order by
/// ascending child id so ranks are stable across runs regardless of
/// storage iteration order. Read-only; inputs are a snapshot at query time.
pub fn family_leaderboard(
    store: &dyn GamifyStore,
    config: &GamifyConfig,
    family_id: &str,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Vec<LeaderboardEntry>> {
    let since = period_start(period, now, config);
    let weights = config.weights;

    let mut rows = Vec::new();
    for child_id in store.family_children(family_id)? {
        let period_points: i64 = store
            .ledger_entries_since(&child_id, since)?
            .iter()
            .filter(|e| e.transaction_type == TransactionType::Earned)
            .map(|e| e.points_amount)
            .sum();
        let period_tasks = store.completion_history(&child_id, since)?.len() as u64;
        let counters = store.child_counters(&child_id)?;
        let achievement_count = store.unlocked_achievements(&child_id)?.len() as u64;

        let score = period_points as f64 * weights.points
            + period_tasks as f64 * weights.tasks
            + counters.current_streak_days as f64 * weights.streak
            + achievement_count as f64 * weights.achievements;

        rows.push(LeaderboardEntry {
            child_id,
            score,
            rank: 0,
            period_points,
            period_tasks,
            current_streak: counters.current_streak_days,
            achievement_count,
        });
    }

    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.child_id.cmp(&b.child_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BonusCategory, CompletionRecord, LedgerEntry, PointsBreakdown, ReferenceType,
    };
    use crate::store::memory::MemoryStore;
    use chrono::Weekday;

    fn now() -> DateTime<Utc> {
        // Wednesday, June 11 2025
        Utc.with_ymd_and_hms(2025, 6, 11, 15, 0, 0).unwrap()
    }

    fn earn(store: &MemoryStore, child_id: &str, amount: i64, at: DateTime<Utc>) {
        let balance = store.child_counters(child_id).unwrap().total_points_earned;
        store
            .append_ledger_entry(&LedgerEntry {
                child_id: child_id.to_string(),
                transaction_type: TransactionType::Earned,
                points_amount: amount,
                balance_after: balance + amount,
                breakdown: PointsBreakdown::new().with(BonusCategory::Base, amount),
                reference_type: ReferenceType::TaskCompletion,
                reference_id: "task".to_string(),
                created_at: at,
            })
            .unwrap();
    }

    #[test]
    fn test_period_starts() {
        let config = GamifyConfig::default();
        assert_eq!(
            period_start(Period::Daily, now(), &config),
            Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap()
        );
        // Default week start is Sunday: June 8
        assert_eq!(
            period_start(Period::Weekly, now(), &config),
            Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period_start(Period::Monthly, now(), &config),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(period_start(Period::AllTime, now(), &config), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_week_start_respects_config() {
        let mut config = GamifyConfig::default();
        config.week_starts_on = Weekday::Mon;
        assert_eq!(
            period_start(Period::Weekly, now(), &config),
            Utc.with_ymd_and_hms(2025, 6, 9, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_daily_start_respects_offset() {
        let mut config = GamifyConfig::default();
        config.utc_offset_hours = 9;
        // 15:00 UTC = June 12 00:00 local; local midnight is 15:00 UTC
        assert_eq!(
            period_start(Period::Daily, now(), &config),
            Utc.with_ymd_and_hms(2025, 6, 11, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ranking_and_tie_break() {
        let store = MemoryStore::new();
        for child in ["alice", "bob", "cara"] {
            store.add_child("fam-1", child);
        }
        let config = GamifyConfig::default();

        // alice and bob tie at 100, cara trails at 50
        earn(&store, "bob", 100, now());
        earn(&store, "alice", 100, now());
        earn(&store, "cara", 50, now());

        let board =
            family_leaderboard(&store, &config, "fam-1", Period::Weekly, now()).unwrap();
        assert_eq!(board.len(), 3);

        // Tie broken by ascending child id
        assert_eq!(board[0].child_id, "alice");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].child_id, "bob");
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[2].child_id, "cara");
        assert_eq!(board[2].rank, 3);
        assert!(board[0].score >= board[1].score && board[1].score > board[2].score);
    }

    #[test]
    fn test_period_filtering_excludes_old_points() {
        let store = MemoryStore::new();
        store.add_child("fam-1", "alice");
        store.add_child("fam-1", "bob");
        let config = GamifyConfig::default();

        // bob earned a lot, but last month
        earn(&store, "bob", 500, now() - Duration::days(30));
        earn(&store, "alice", 20, now());

        let board =
            family_leaderboard(&store, &config, "fam-1", Period::Weekly, now()).unwrap();
        assert_eq!(board[0].child_id, "alice");
        assert_eq!(board[0].period_points, 20);
        assert_eq!(board[1].period_points, 0);

        // All-time flips the order
        let board =
            family_leaderboard(&store, &config, "fam-1", Period::AllTime, now()).unwrap();
        assert_eq!(board[0].child_id, "bob");
        assert_eq!(board[0].period_points, 500);
    }

    #[test]
    fn test_composite_score_weights() {
        let store = MemoryStore::new();
        store.add_child("fam-1", "alice");
        let config = GamifyConfig::default();

        earn(&store, "alice", 40, now());
        store.record_completion(CompletionRecord {
            child_id: "alice".to_string(),
            approved_at: now(),
            task_difficulty: None,
            task_category: "chores".to_string(),
            due_date: None,
        });

        let board =
            family_leaderboard(&store, &config, "fam-1", Period::Weekly, now()).unwrap();
        // 40 points x1.0 + 1 task x5.0
        assert_eq!(board[0].score, 45.0);
    }

    #[test]
    fn test_unknown_family_is_not_found() {
        let store = MemoryStore::new();
        let config = GamifyConfig::default();
        assert!(family_leaderboard(&store, &config, "ghost", Period::Weekly, now()).is_err());
    }
}
