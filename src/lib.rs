// chorestar - gamification engine for a family task app
//
// Converts approved task completions into points, XP, levels, streaks,
// bonuses, achievements, and leaderboard rankings. Every award is
// deterministic and re-derivable: the point ledger is append-only and is
// the sole source of truth for balances, while per-child counters are a
// rebuildable projection.
//
// The engine is storage-agnostic. Hosts supply a `GamifyStore`
// implementation (relational, document, or the bundled in-memory store);
// the engine only reads snapshots and issues append requests.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use config::{GamifyConfig, ScoreWeights};
pub use engine::{AchievementCatalog, ApprovalOutcome, GamificationEngine, StreakStatus};
pub use error::{GamifyError, Result};
pub use store::memory::MemoryStore;
pub use store::{GamifyStore, ProgressUpdate};
