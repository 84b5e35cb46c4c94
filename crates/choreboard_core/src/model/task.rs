//! Task model, creation input and partial-update patch.
//!
//! # Invariants
//! - `title` is stored trimmed and non-empty.
//! - `completed_at` is only set by completion; `is_completed` is the source of
//!   truth for completion state.
//! - `assigned_to` is expected to name an existing user, but referential
//!   integrity is not enforced.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

/// Advisory repeat cadence. No recurrence engine acts on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    #[default]
    Chores,
    Homework,
    Personal,
    Other,
}

impl TaskCategory {
    /// Fixed display order used by category statistics.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Chores,
        TaskCategory::Homework,
        TaskCategory::Personal,
        TaskCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Chores => "chores",
            Self::Homework => "homework",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// One assigned piece of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: UserId,
    pub created_by: UserId,
    /// Unix epoch milliseconds.
    pub due_date: i64,
    /// Unix epoch milliseconds of the latest completion.
    pub completed_at: Option<i64>,
    pub is_completed: bool,
    pub repeat_type: RepeatType,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    /// Reward points. Absent counts as zero in every aggregate.
    pub points: Option<u32>,
}

impl Task {
    /// Points contributed to aggregates.
    pub fn point_value(&self) -> u64 {
        u64::from(self.points.unwrap_or(0))
    }

    /// Overdue means still open with a due date strictly before `now_ms`.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.is_completed && self.due_date < now_ms
    }
}

/// Input for `TaskStore::add_task`.
///
/// Optional fields mirror what a form may leave blank; the store rejects the
/// ones that are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<UserId>,
    pub created_by: UserId,
    pub due_date: Option<i64>,
    pub repeat_type: RepeatType,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub points: Option<u32>,
}

impl NewTask {
    /// Starts a request with every required field filled in.
    pub fn new(
        title: impl Into<String>,
        assigned_to: UserId,
        created_by: UserId,
        due_date: i64,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            assigned_to: Some(assigned_to),
            created_by,
            due_date: Some(due_date),
            repeat_type: RepeatType::default(),
            category: TaskCategory::default(),
            priority: TaskPriority::default(),
            points: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn repeat(mut self, repeat_type: RepeatType) -> Self {
        self.repeat_type = repeat_type;
        self
    }

    pub fn points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }
}

/// Partial update for `TaskStore::update_task`. `None` leaves a field as is.
///
/// `description`, `completed_at` and `points` use a nested option so callers
/// can distinguish "keep" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<i64>,
    pub is_completed: Option<bool>,
    pub completed_at: Option<Option<i64>>,
    pub repeat_type: Option<RepeatType>,
    pub category: Option<TaskCategory>,
    pub priority: Option<TaskPriority>,
    pub points: Option<Option<u32>>,
}

impl TaskPatch {
    /// `true` when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
