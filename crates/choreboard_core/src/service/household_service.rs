//! Household use-case service.
//!
//! # Responsibility
//! - Run the screen-level flows on top of `TaskStore`: member registration,
//!   the task form, completing as the current actor, dashboard statistics.
//! - Keep caller policies (unique member names, palette colors, points input
//!   parsing) out of the store.
//!
//! # Invariants
//! - Member names are unique case-insensitively when added through
//!   `add_member`; `TaskStore::add_user` itself accepts duplicates.
//! - Tasks are created and completed on behalf of an explicit session actor.

use crate::model::task::{NewTask, RepeatType, Task, TaskCategory, TaskId, TaskPriority};
use crate::model::user::{User, UserId};
use crate::model::validation::ValidationError;
use crate::store::clock::{Clock, SystemClock};
use crate::store::task_store::{CompletionStats, StoreError, TaskStore};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Avatar colors handed out to new members in order.
pub const USER_COLORS: [&str; 8] = [
    "#E74C3C", "#3498DB", "#9B59B6", "#F39C12", "#27AE60", "#E67E22", "#2ECC71", "#8E44AD",
];

pub const DEFAULT_POINTS_INPUT: &str = "10";

static LEADING_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer regex"));

/// Errors from household flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HouseholdError {
    Validation(ValidationError),
    /// Another member already uses this name (case-insensitive).
    DuplicateName(String),
    /// Points input is not a non-negative integer.
    InvalidPoints(String),
    /// The session has no acting member.
    NoActor,
}

impl Display for HouseholdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "a member named `{name}` already exists"),
            Self::InvalidPoints(raw) => write!(
                f,
                "points must be a whole number of at least 0, got `{raw}`"
            ),
            Self::NoActor => write!(f, "no acting member in session"),
        }
    }
}

impl Error for HouseholdError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for HouseholdError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for HouseholdError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
        }
    }
}

/// Who is acting in the app. Completions and new tasks are attributed to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    actor: Option<UserId>,
}

impl Session {
    pub fn new(actor: UserId) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session acting as the first parent in the store, if any.
    pub fn first_parent<C: Clock>(store: &TaskStore<C>) -> Self {
        Self {
            actor: store.list_parents().first().map(|parent| parent.id),
        }
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }
}

/// Raw task form input, as typed by a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub assigned_to: Option<UserId>,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    /// Free text; leading-integer parse.
    pub points: String,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    pub repeat_type: RepeatType,
}

impl TaskForm {
    pub fn new(title: impl Into<String>, assigned_to: UserId, due_date: i64) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            assigned_to: Some(assigned_to),
            due_date: Some(due_date),
            points: DEFAULT_POINTS_INPUT.to_string(),
            category: TaskCategory::default(),
            priority: TaskPriority::default(),
            repeat_type: RepeatType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: TaskCategory,
    pub stats: CompletionStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildSummary {
    pub user: User,
    pub stats: CompletionStats,
    pub points: u64,
}

/// Household-wide numbers for the statistics screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Rounded share of completed tasks, 0 with no tasks.
    pub completion_rate: u32,
    /// One entry per category in `TaskCategory::ALL` order.
    pub categories: Vec<CategoryStats>,
    pub children: Vec<ChildSummary>,
    pub top_performer: Option<User>,
}

/// One member's task lists as shown on their detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOverview {
    pub user: User,
    pub stats: CompletionStats,
    pub points: u64,
    /// Open tasks, soonest due first.
    pub pending: Vec<Task>,
    /// Completed tasks, most recently completed first.
    pub completed: Vec<Task>,
    pub overdue_count: usize,
}

/// Screen-facing facade over one household store.
pub struct HouseholdService<C: Clock = SystemClock> {
    store: TaskStore<C>,
    session: Session,
}

impl<C: Clock> HouseholdService<C> {
    pub fn new(store: TaskStore<C>, session: Session) -> Self {
        Self { store, session }
    }

    /// Wraps `store` with a session acting as its first parent.
    pub fn with_first_parent(store: TaskStore<C>) -> Self {
        let session = Session::first_parent(&store);
        Self::new(store, session)
    }

    pub fn store(&self) -> &TaskStore<C> {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Adds a member with a unique name and the next free palette color.
    ///
    /// # Errors
    /// - `Validation(EmptyUserName)` for a blank name.
    /// - `DuplicateName` when another member has the same name ignoring case.
    pub fn add_member(&mut self, name: &str, is_parent: bool) -> Result<User, HouseholdError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyUserName.into());
        }

        let users = self.store.list_users();
        let wanted = trimmed.to_lowercase();
        if users.iter().any(|user| user.name.to_lowercase() == wanted) {
            debug!("event=member_add module=household status=skip reason=duplicate_name");
            return Err(HouseholdError::DuplicateName(trimmed.to_string()));
        }

        let color = USER_COLORS
            .iter()
            .find(|color| !users.iter().any(|user| user.color == **color))
            .copied()
            .unwrap_or(USER_COLORS[0]);
        let user = self.store.add_user(trimmed, is_parent, color)?;
        info!(
            "event=member_add module=household status=ok user_id={} color={}",
            user.id, user.color
        );
        Ok(user)
    }

    /// Validates the task form and creates the task as the session actor.
    ///
    /// # Errors
    /// - `Validation` for a blank title, missing assignee or bad due date.
    /// - `NoActor` when the session has nobody to attribute the task to.
    /// - `InvalidPoints` when points are not a non-negative integer.
    pub fn create_task(&mut self, form: TaskForm) -> Result<Task, HouseholdError> {
        if form.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let assigned_to = form.assigned_to.ok_or(ValidationError::MissingAssignee)?;
        let creator = self.session.actor.ok_or(HouseholdError::NoActor)?;
        let points = parse_points_input(&form.points)?;
        let due_date = form.due_date.ok_or(ValidationError::MissingDueDate)?;

        let mut request = NewTask::new(form.title, assigned_to, creator, due_date)
            .category(form.category)
            .priority(form.priority)
            .repeat(form.repeat_type)
            .points(points);
        if !form.description.trim().is_empty() {
            request = request.description(form.description);
        }
        Ok(self.store.add_task(request)?)
    }

    /// Completes `task_id` as the session actor.
    ///
    /// Returns `Ok(false)` for an unknown task.
    ///
    /// # Errors
    /// - `NoActor` when the session has no acting member.
    pub fn complete_for_actor(
        &mut self,
        task_id: TaskId,
        notes: Option<&str>,
    ) -> Result<bool, HouseholdError> {
        let actor = self.session.actor.ok_or(HouseholdError::NoActor)?;
        Ok(self.store.complete_task(task_id, actor, notes))
    }

    /// Aggregates household-wide statistics at the current instant.
    pub fn dashboard(&self) -> HouseholdStats {
        let now = self.store.now_ms();
        let tasks = self.store.list_tasks();
        let completed = tasks.iter().filter(|task| task.is_completed).count();
        let overdue = tasks.iter().filter(|task| task.is_overdue(now)).count();

        let categories = TaskCategory::ALL
            .iter()
            .map(|category| {
                let (done, total) = tasks
                    .iter()
                    .filter(|task| task.category == *category)
                    .fold((0, 0), |(done, total), task| {
                        (done + usize::from(task.is_completed), total + 1)
                    });
                CategoryStats {
                    category: *category,
                    stats: CompletionStats::from_counts(done, total),
                }
            })
            .collect();

        let children = self
            .store
            .list_children()
            .into_iter()
            .map(|user| ChildSummary {
                stats: self.store.get_completion_stats(user.id),
                points: self.store.get_total_points(user.id),
                user,
            })
            .collect::<Vec<_>>();
        let top_performer = top_performer(&children).map(|child| child.user.clone());

        HouseholdStats {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            overdue,
            completion_rate: CompletionStats::from_counts(completed, tasks.len()).percentage,
            categories,
            children,
            top_performer,
        }
    }

    /// Detail view for one member, or `None` for an unknown id.
    pub fn member_overview(&self, user_id: UserId) -> Option<MemberOverview> {
        let user = self.store.get_user(user_id)?;
        let now = self.store.now_ms();
        let tasks = self.store.list_tasks_for_user(user_id);
        let overdue_count = tasks.iter().filter(|task| task.is_overdue(now)).count();

        let (mut completed, mut pending): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|task| task.is_completed);
        pending.sort_by_key(|task| task.due_date);
        completed.sort_by(|a, b| {
            b.completed_at
                .unwrap_or(0)
                .cmp(&a.completed_at.unwrap_or(0))
        });

        Some(MemberOverview {
            stats: self.store.get_completion_stats(user_id),
            points: self.store.get_total_points(user_id),
            user,
            pending,
            completed,
            overdue_count,
        })
    }
}

/// Highest completion percentage; ties go to more completed tasks, then to
/// the earlier child.
fn top_performer(children: &[ChildSummary]) -> Option<&ChildSummary> {
    children.iter().reduce(|top, child| {
        let better = child.stats.percentage > top.stats.percentage
            || (child.stats.percentage == top.stats.percentage
                && child.stats.completed > top.stats.completed);
        if better {
            child
        } else {
            top
        }
    })
}

/// Parses points form input using its leading integer (`" 7 pts"` is 7).
///
/// # Errors
/// - `InvalidPoints` when no leading integer exists, it is negative, or it
///   does not fit in `u32`.
pub fn parse_points_input(raw: &str) -> Result<u32, HouseholdError> {
    LEADING_INTEGER_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<i64>().ok())
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| HouseholdError::InvalidPoints(raw.to_string()))
}

/// Short distance label between a due date and `now_ms`: `45m`, `3h`, `2d`.
///
/// Uses the absolute distance, so overdue and upcoming tasks read the same.
pub fn due_label(due_date: i64, now_ms: i64) -> String {
    let diff_hours = due_date.abs_diff(now_ms) as f64 / 3_600_000.0;
    if diff_hours < 1.0 {
        format!("{}m", (diff_hours * 60.0).round() as u64)
    } else if diff_hours < 24.0 {
        format!("{}h", diff_hours.round() as u64)
    } else {
        format!("{}d", (diff_hours / 24.0).round() as u64)
    }
}
