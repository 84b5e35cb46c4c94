//! Core logic for the Choreboard household task app.
//!
//! The store owns members, tasks and completion history; the sheet module
//! models the draggable bottom sheet screens open for quick actions.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod sheet;
pub mod store;

pub use config::{AppConfig, ConfigError, SheetConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::completion::{CompletionId, TaskCompletion};
pub use model::task::{
    NewTask, RepeatType, Task, TaskCategory, TaskId, TaskPatch, TaskPriority,
};
pub use model::user::{User, UserId};
pub use model::validation::ValidationError;
pub use service::household_service::{
    due_label, parse_points_input, CategoryStats, ChildSummary, HouseholdError, HouseholdService,
    HouseholdStats, MemberOverview, Session, TaskForm,
};
pub use sheet::animation::{AnimatedValue, Easing, Tick};
pub use sheet::engine::{
    DragState, DragStateChange, DragUpdate, SheetEngine, SnapDecision, SnapPoint,
};
pub use sheet::shell::{BottomSheet, SheetFrame};
pub use store::clock::{Clock, FixedClock, SystemClock};
pub use store::task_store::{
    completion_percentage, CompletionStats, FilterCounts, StoreError, StoreResult, TaskFilter,
    TaskStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
