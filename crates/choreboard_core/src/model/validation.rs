//! Field validation errors for store mutations.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected input to a user or task mutation.
///
/// Surfaced to callers so the UI can prompt for a correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User name is blank after trim.
    EmptyUserName,
    /// Task title is blank after trim.
    EmptyTitle,
    /// Task has no assignee.
    MissingAssignee,
    /// Task has no due date.
    MissingDueDate,
    /// Due date is outside the representable calendar range.
    InvalidDueDate(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUserName => write!(f, "user name is required"),
            Self::EmptyTitle => write!(f, "task title is required"),
            Self::MissingAssignee => write!(f, "task must be assigned to a user"),
            Self::MissingDueDate => write!(f, "task must have a due date"),
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` is not a valid instant")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns the trimmed value, or `None` when nothing is left.
pub(crate) fn trimmed_non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Checks that an epoch-millisecond value maps to a calendar instant.
pub(crate) fn validate_instant(epoch_ms: i64) -> Result<i64, ValidationError> {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(epoch_ms)
        .map(|_| epoch_ms)
        .ok_or(ValidationError::InvalidDueDate(epoch_ms))
}

#[cfg(test)]
mod tests {
    use super::{trimmed_non_empty, validate_instant, ValidationError};

    #[test]
    fn trimmed_non_empty_drops_blank_values() {
        assert_eq!(trimmed_non_empty("   "), None);
        assert_eq!(trimmed_non_empty("  Clean room ").as_deref(), Some("Clean room"));
    }

    #[test]
    fn validate_instant_rejects_out_of_range_values() {
        assert_eq!(validate_instant(1_700_000_000_000), Ok(1_700_000_000_000));
        assert_eq!(
            validate_instant(i64::MAX),
            Err(ValidationError::InvalidDueDate(i64::MAX))
        );
    }
}
