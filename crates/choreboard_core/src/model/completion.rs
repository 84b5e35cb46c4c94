//! Completion log entries.

use crate::model::task::TaskId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CompletionId = Uuid;

/// Immutable record of who completed a task and when.
///
/// Records outlive their task: deleting a task leaves its history in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub id: CompletionId,
    pub task_id: TaskId,
    pub user_id: UserId,
    /// Unix epoch milliseconds.
    pub completed_at: i64,
    pub notes: Option<String>,
}
