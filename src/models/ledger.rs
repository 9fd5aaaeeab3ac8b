// Point ledger data model
// Append-only: entries are immutable once created and are never deleted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of point transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earned,
    Redeemed,
    Bonus,
    Penalty,
    Adjustment,
}

/// What kind of record a ledger entry refers back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    TaskCompletion,
    AchievementUnlock,
    RewardRedemption,
    ManualAdjustment,
}

/// Bonus categories an award can be itemized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusCategory {
    Base,
    Streak,
    Milestone,
    Early,
    Achievement,
}

/// Itemized composition of a single award, persisted verbatim on the
/// ledger entry so every point is traceable to its source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsBreakdown(BTreeMap<BonusCategory, i64>);

impl PointsBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; zero contributions are omitted
    pub fn with(mut self, category: BonusCategory, amount: i64) -> Self {
        self.set(category, amount);
        self
    }

    pub fn set(&mut self, category: BonusCategory, amount: i64) {
        if amount != 0 {
            self.0.insert(category, amount);
        }
    }

    /// Contribution for a category, 0 if absent
    pub fn get(&self, category: BonusCategory) -> i64 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Sum of all contributions; must equal the entry's `points_amount`
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }
}

/// One immutable point transaction.
///
/// `balance_after` must equal the running sum of `points_amount` for the
/// child across all prior entries in creation order; stores reject appends
/// that violate this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "childId")]
    pub child_id: String,
    #[serde(rename = "transactionType")]
    pub transaction_type: TransactionType,
    #[serde(rename = "pointsAmount")]
    pub points_amount: i64,
    #[serde(rename = "balanceAfter")]
    pub balance_after: i64,
    pub breakdown: PointsBreakdown,
    #[serde(rename = "referenceType")]
    pub reference_type: ReferenceType,
    #[serde(rename = "referenceId")]
    pub reference_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_total() {
        let breakdown = PointsBreakdown::new()
            .with(BonusCategory::Base, 100)
            .with(BonusCategory::Streak, 25)
            .with(BonusCategory::Milestone, 35);
        assert_eq!(breakdown.total(), 160);
        assert_eq!(breakdown.get(BonusCategory::Early), 0);
    }

    #[test]
    fn test_breakdown_omits_zero_contributions() {
        let breakdown = PointsBreakdown::new()
            .with(BonusCategory::Base, 100)
            .with(BonusCategory::Milestone, 0);
        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(json, r#"{"base":100}"#);
    }
}
