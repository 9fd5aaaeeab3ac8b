// Value objects shared across the engine
pub mod achievement;
pub mod child;
pub mod completion;
pub mod leaderboard;
pub mod ledger;

pub use achievement::{AchievementDefinition, AchievementTier, UnlockCriteria, UnlockedAchievement};
pub use child::ChildCounterState;
pub use completion::{CompletionRecord, TaskDifficulty, TaskInput};
pub use leaderboard::{LeaderboardEntry, Period};
pub use ledger::{BonusCategory, LedgerEntry, PointsBreakdown, ReferenceType, TransactionType};
