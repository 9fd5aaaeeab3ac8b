// Task completion data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Approved task completion, consumed read-only from the external task
/// store. The engine buckets these into streak days and re-derives XP
/// from them during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(rename = "childId")]
    pub child_id: String,
    #[serde(rename = "approvedAt")]
    pub approved_at: DateTime<Utc>,
    /// Absent when the task was never rated
    #[serde(rename = "taskDifficulty")]
    pub task_difficulty: Option<TaskDifficulty>,
    #[serde(rename = "taskCategory")]
    pub task_category: String,
    #[serde(rename = "dueDate")]
    pub due_date: Option<DateTime<Utc>>,
}

/// The approved task as the engine sees it at award time
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub task_id: String,
    pub base_points: i64,
    pub difficulty: Option<TaskDifficulty>,
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
}
