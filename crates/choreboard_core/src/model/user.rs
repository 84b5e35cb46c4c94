//! Household member model.
//!
//! # Invariants
//! - `id` is unique for the process lifetime.
//! - `name` is stored trimmed and is never empty.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Household member: a parent who assigns work or a child who receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub is_parent: bool,
    /// Optional avatar image reference. The app renders initials when absent.
    pub avatar: Option<String>,
    /// Avatar background color, e.g. `#E74C3C`.
    pub color: String,
}

impl User {
    /// Builds a member with a fresh id. Does not validate `name`.
    pub fn new(name: impl Into<String>, is_parent: bool, color: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, is_parent, color)
    }

    /// Builds a member with a caller-provided id (sample data, imports).
    pub fn with_id(
        id: UserId,
        name: impl Into<String>,
        is_parent: bool,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            is_parent,
            avatar: None,
            color: color.into(),
        }
    }

    pub fn is_child(&self) -> bool {
        !self.is_parent
    }
}
