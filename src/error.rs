// Error taxonomy for the gamification core

use thiserror::Error;

/// Errors surfaced by the engine and by store implementations.
///
/// The core never retries internally; retry policy belongs to the
/// transactional boundary at the call site.
#[derive(Debug, Error)]
pub enum GamifyError {
    /// Malformed input, rejected before any computation runs
    #[error("validation failed: {0}")]
    Validation(String),

    /// Ledger running-balance mismatch on append. Fatal for that single
    /// append; prior entries are left untouched.
    #[error("ledger integrity violation for child {child_id}: declared balance {declared}, recomputed {expected}")]
    Integrity {
        child_id: String,
        expected: i64,
        declared: i64,
    },

    /// Referenced child, family, or achievement does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Achievement catalog file could not be read
    #[error("catalog read error: {0}")]
    Io(#[from] std::io::Error),

    /// Achievement catalog file could not be parsed
    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GamifyError>;
