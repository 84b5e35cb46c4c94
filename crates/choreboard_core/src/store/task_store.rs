//! Household store: users, tasks and the completion log.
//!
//! # Responsibility
//! - Provide query projections over users and tasks.
//! - Validate and apply task/user mutations.
//! - Aggregate per-user completion statistics and points.
//!
//! # Invariants
//! - Reads return owned copies; mutating them never touches the store.
//! - `add_*` always assigns a fresh id and appends in insertion order.
//! - `complete_task` is not idempotent: each call appends one completion
//!   record and overwrites `completed_at`.
//! - Deleting a task keeps its completion records as orphaned history.

use crate::model::completion::TaskCompletion;
use crate::model::task::{
    NewTask, RepeatType, Task, TaskCategory, TaskId, TaskPatch, TaskPriority,
};
use crate::model::user::{User, UserId};
use crate::model::validation::{trimmed_non_empty, validate_instant, ValidationError};
use crate::store::clock::{Clock, SystemClock};
use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HOUR_MS: i64 = 60 * 60 * 1000;
const MINUTE_MS: i64 = 60 * 1000;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(ValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Completion summary for one assignee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    /// `round(completed / total * 100)`, or 0 when `total == 0`.
    pub percentage: u32,
}

impl CompletionStats {
    pub fn from_counts(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percentage: completion_percentage(completed, total),
        }
    }
}

/// Task list filters offered by the task overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Pending,
        TaskFilter::Completed,
        TaskFilter::Overdue,
    ];

    fn matches(self, task: &Task, now_ms: i64) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.is_completed,
            Self::Completed => task.is_completed,
            Self::Overdue => task.is_overdue(now_ms),
        }
    }
}

/// Number of tasks matched by each filter, in `TaskFilter::ALL` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Rounds `completed / total` to a whole percentage, half away from zero.
///
/// Returns 0 for an empty total.
pub fn completion_percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u64;
    let total = total as u64;
    ((completed * 200 + total) / (total * 2)) as u32
}

/// Volatile store for one household.
///
/// Constructed once at startup and handed to whoever needs it; there is no
/// process-wide instance.
pub struct TaskStore<C: Clock = SystemClock> {
    clock: C,
    users: Vec<User>,
    tasks: Vec<Task>,
    completions: Vec<TaskCompletion>,
}

impl<C: Clock> TaskStore<C> {
    /// Creates an empty store reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            users: Vec::new(),
            tasks: Vec::new(),
            completions: Vec::new(),
        }
    }

    /// Creates a store seeded with the demo household.
    ///
    /// Two parents, two children and four tasks due around `clock.now_ms()`:
    /// one overdue, one already completed.
    pub fn with_sample_data(clock: C) -> Self {
        let mut store = Self::new(clock);
        let now = store.clock.now_ms();

        let mom = User::new("Mom", true, "#E74C3C");
        let dad = User::new("Dad", true, "#3498DB");
        let emma = User::new("Emma", false, "#9B59B6");
        let jake = User::new("Jake", false, "#F39C12");

        let sample = |title: &str,
                      description: &str,
                      assignee: &User,
                      creator: &User,
                      due_offset_ms: i64,
                      repeat_type: RepeatType,
                      category: TaskCategory,
                      priority: TaskPriority,
                      points: u32| Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: Some(description.to_string()),
            assigned_to: assignee.id,
            created_by: creator.id,
            due_date: now + due_offset_ms,
            completed_at: None,
            is_completed: false,
            repeat_type,
            category,
            priority,
            points: Some(points),
        };

        let mut practice = sample(
            "Practice piano",
            "30 minutes of practice",
            &jake,
            &mom,
            3 * HOUR_MS,
            RepeatType::Daily,
            TaskCategory::Personal,
            TaskPriority::Medium,
            8,
        );
        practice.is_completed = true;
        practice.completed_at = Some(now - HOUR_MS);

        store.tasks = vec![
            sample(
                "Clean bedroom",
                "Make bed, organize toys, vacuum floor",
                &emma,
                &mom,
                24 * HOUR_MS,
                RepeatType::Weekly,
                TaskCategory::Chores,
                TaskPriority::Medium,
                10,
            ),
            sample(
                "Math homework",
                "Complete pages 45-47",
                &jake,
                &dad,
                2 * HOUR_MS,
                RepeatType::Daily,
                TaskCategory::Homework,
                TaskPriority::High,
                15,
            ),
            sample(
                "Feed the dog",
                "Give Buddy his morning food and fresh water",
                &emma,
                &mom,
                -30 * MINUTE_MS,
                RepeatType::Daily,
                TaskCategory::Chores,
                TaskPriority::High,
                5,
            ),
            practice,
        ];
        store.users = vec![mom, dad, emma, jake];

        info!(
            "event=store_seed module=store status=ok users={} tasks={}",
            store.users.len(),
            store.tasks.len()
        );
        store
    }

    /// Current instant according to the store clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    // Users

    /// All members in insertion order.
    pub fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    /// Member by id, or `None` when unknown.
    pub fn get_user(&self, id: UserId) -> Option<User> {
        let found = self.users.iter().find(|user| user.id == id).cloned();
        if found.is_none() {
            debug!("event=user_get module=store status=skip reason=not_found user_id={id}");
        }
        found
    }

    /// Members flagged as parents, in insertion order.
    pub fn list_parents(&self) -> Vec<User> {
        self.users
            .iter()
            .filter(|user| user.is_parent)
            .cloned()
            .collect()
    }

    /// Members who are not parents, in insertion order.
    pub fn list_children(&self) -> Vec<User> {
        self.users
            .iter()
            .filter(|user| user.is_child())
            .cloned()
            .collect()
    }

    /// Adds one member with a fresh id and trimmed name.
    ///
    /// Duplicate names are accepted here; uniqueness is a caller policy.
    ///
    /// # Errors
    /// - `ValidationError::EmptyUserName` when `name` is blank.
    pub fn add_user(&mut self, name: &str, is_parent: bool, color: &str) -> StoreResult<User> {
        let name = trimmed_non_empty(name).ok_or(ValidationError::EmptyUserName)?;
        let user = User::new(name, is_parent, color);
        self.users.push(user.clone());
        info!(
            "event=user_add module=store status=ok user_id={} is_parent={}",
            user.id, user.is_parent
        );
        Ok(user)
    }

    // Tasks

    /// All tasks in insertion order.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Task by id, or `None` when unknown or deleted.
    pub fn get_task(&self, id: TaskId) -> Option<Task> {
        let found = self.find_task(id).cloned();
        if found.is_none() {
            debug!("event=task_get module=store status=skip reason=not_found task_id={id}");
        }
        found
    }

    /// Tasks assigned to `user_id`, in insertion order.
    pub fn list_tasks_for_user(&self, user_id: UserId) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.assigned_to == user_id)
            .cloned()
            .collect()
    }

    /// Open tasks whose due date has passed, evaluated at call time.
    pub fn list_overdue_tasks(&self) -> Vec<Task> {
        let now = self.clock.now_ms();
        self.tasks
            .iter()
            .filter(|task| task.is_overdue(now))
            .cloned()
            .collect()
    }

    /// Tasks due during the current local calendar day, completed or not.
    pub fn list_tasks_due_today(&self) -> Vec<Task> {
        let Some((start, end)) = local_day_window(self.clock.now_ms()) else {
            debug!("event=tasks_due_today module=store status=skip reason=clock_out_of_range");
            return Vec::new();
        };
        self.tasks
            .iter()
            .filter(|task| task.due_date >= start && task.due_date < end)
            .cloned()
            .collect()
    }

    /// Filtered task list: open tasks first by due date ascending, then
    /// completed tasks by due date descending.
    pub fn list_tasks_filtered(&self, filter: TaskFilter) -> Vec<Task> {
        let now = self.clock.now_ms();
        let mut tasks = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task, now))
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by(|a, b| match (a.is_completed, b.is_completed) {
            (false, false) => a.due_date.cmp(&b.due_date),
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (true, true) => b.due_date.cmp(&a.due_date),
        });
        tasks
    }

    /// Task count per `TaskFilter`, evaluated at call time.
    pub fn filter_counts(&self) -> FilterCounts {
        let now = self.clock.now_ms();
        let count = |filter: TaskFilter| {
            self.tasks
                .iter()
                .filter(|task| filter.matches(task, now))
                .count()
        };
        FilterCounts {
            all: count(TaskFilter::All),
            pending: count(TaskFilter::Pending),
            completed: count(TaskFilter::Completed),
            overdue: count(TaskFilter::Overdue),
        }
    }

    /// Up to `limit` tasks with the latest due dates first.
    pub fn recent_tasks(&self, limit: usize) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        tasks.truncate(limit);
        tasks
    }

    /// Validates and appends a new open task.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `MissingAssignee` when no assignee is given.
    /// - `MissingDueDate` / `InvalidDueDate` for an absent or unrepresentable
    ///   due date.
    pub fn add_task(&mut self, input: NewTask) -> StoreResult<Task> {
        let title = trimmed_non_empty(&input.title).ok_or(ValidationError::EmptyTitle)?;
        let assigned_to = input.assigned_to.ok_or(ValidationError::MissingAssignee)?;
        let due_date = input.due_date.ok_or(ValidationError::MissingDueDate)?;
        let due_date = validate_instant(due_date)?;

        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: input.description.as_deref().and_then(trimmed_non_empty),
            assigned_to,
            created_by: input.created_by,
            due_date,
            completed_at: None,
            is_completed: false,
            repeat_type: input.repeat_type,
            category: input.category,
            priority: input.priority,
            points: input.points,
        };
        self.tasks.push(task.clone());
        info!(
            "event=task_add module=store status=ok task_id={} assigned_to={} title={}",
            task.id, task.assigned_to, task.title
        );
        Ok(task)
    }

    /// Merges `patch` into an existing task.
    ///
    /// Returns `Ok(None)` for an unknown id and the unchanged task for an
    /// empty patch. Validation runs before any field is written, so a rejected
    /// patch leaves the task untouched.
    ///
    /// # Errors
    /// - `EmptyTitle` when a provided title is blank.
    /// - `InvalidDueDate` when a provided due date is unrepresentable.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<Option<Task>> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_update module=store status=skip reason=not_found task_id={id}");
            return Ok(None);
        };
        if patch.is_empty() {
            debug!("event=task_update module=store status=skip reason=empty_patch task_id={id}");
            return Ok(Some(self.tasks[index].clone()));
        }

        let title = match patch.title.as_deref() {
            Some(value) => Some(trimmed_non_empty(value).ok_or(ValidationError::EmptyTitle)?),
            None => None,
        };
        let due_date = patch.due_date.map(validate_instant).transpose()?;

        let task = &mut self.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description.as_deref().and_then(trimmed_non_empty);
        }
        if let Some(assigned_to) = patch.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        if let Some(is_completed) = patch.is_completed {
            task.is_completed = is_completed;
        }
        if let Some(completed_at) = patch.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(repeat_type) = patch.repeat_type {
            task.repeat_type = repeat_type;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(points) = patch.points {
            task.points = points;
        }

        info!(
            "event=task_update module=store status=ok task_id={} title={}",
            task.id, task.title
        );
        Ok(Some(task.clone()))
    }

    /// Marks a task completed by `user_id` and appends a completion record.
    ///
    /// Returns `false` when the task is unknown or `user_id` is nil. Calling
    /// this again on a completed task appends another record and moves
    /// `completed_at` forward.
    pub fn complete_task(&mut self, task_id: TaskId, user_id: UserId, notes: Option<&str>) -> bool {
        if user_id.is_nil() {
            debug!("event=task_complete module=store status=skip reason=nil_user task_id={task_id}");
            return false;
        }
        let Some(previous) = self.find_task(task_id).map(|task| task.is_completed) else {
            debug!("event=task_complete module=store status=skip reason=not_found task_id={task_id}");
            return false;
        };

        let now = self.clock.now_ms();
        let patch = TaskPatch {
            is_completed: Some(true),
            completed_at: Some(Some(now)),
            ..TaskPatch::default()
        };
        // A completion patch carries no title/due date, so validation cannot reject it.
        let Ok(Some(_)) = self.update_task(task_id, patch) else {
            debug!("event=task_complete module=store status=skip reason=update_failed task_id={task_id}");
            return false;
        };

        let completion = TaskCompletion {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            completed_at: now,
            notes: notes.and_then(trimmed_non_empty),
        };
        self.completions.push(completion);
        info!(
            "event=task_complete module=store status=ok task_id={task_id} user_id={user_id} repeat={previous}"
        );
        true
    }

    /// Removes a task. Its completion records stay in the log.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_delete module=store status=skip reason=not_found task_id={id}");
            return false;
        };
        let task = self.tasks.remove(index);
        info!(
            "event=task_delete module=store status=ok task_id={} title={}",
            task.id, task.title
        );
        true
    }

    // Completion log

    /// Full completion log, oldest first, including records of deleted tasks.
    pub fn list_completions(&self) -> Vec<TaskCompletion> {
        self.completions.clone()
    }

    /// Completion records for `task_id`, oldest first; empty when none exist.
    pub fn completions_for_task(&self, task_id: TaskId) -> Vec<TaskCompletion> {
        self.completions
            .iter()
            .filter(|completion| completion.task_id == task_id)
            .cloned()
            .collect()
    }

    // Statistics

    /// Completed vs. assigned task counts for `user_id`; all zero for an
    /// unknown user or one without tasks.
    pub fn get_completion_stats(&self, user_id: UserId) -> CompletionStats {
        let (completed, total) = self
            .tasks
            .iter()
            .filter(|task| task.assigned_to == user_id)
            .fold((0, 0), |(completed, total), task| {
                (completed + usize::from(task.is_completed), total + 1)
            });
        CompletionStats::from_counts(completed, total)
    }

    /// Sum of points over completed tasks assigned to `user_id`.
    pub fn get_total_points(&self, user_id: UserId) -> u64 {
        self.tasks
            .iter()
            .filter(|task| task.assigned_to == user_id && task.is_completed)
            .map(Task::point_value)
            .sum()
    }

    fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

impl Default for TaskStore<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

/// `[local midnight, next local midnight)` around `now_ms`, in epoch millis.
fn local_day_window(now_ms: i64) -> Option<(i64, i64)> {
    let today = DateTime::<Utc>::from_timestamp_millis(now_ms)?
        .with_timezone(&Local)
        .date_naive();
    let start = local_midnight_ms(today)?;
    let end = local_midnight_ms(today.succ_opt()?)?;
    Some((start, end))
}

fn local_midnight_ms(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|instant| instant.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{completion_percentage, local_day_window};

    #[test]
    fn percentage_rounds_half_up_and_handles_empty_total() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(3, 3), 100);
    }

    #[test]
    fn local_day_window_contains_now() {
        let now = 1_760_000_000_000;
        let (start, end) = local_day_window(now).expect("window should exist");
        assert!(start <= now && now < end);
        assert!(end - start >= 23 * 60 * 60 * 1000);
        assert!(end - start <= 25 * 60 * 60 * 1000);
    }
}
