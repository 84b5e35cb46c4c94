//! Household domain model: members, tasks and the completion log.
//!
//! # Responsibility
//! - Define canonical data structures shared by the store and its callers.
//! - Own field-level validation rules used before any mutation lands.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Instants are Unix epoch milliseconds.
//! - Completion records are append-only history, never edited.

pub mod completion;
pub mod task;
pub mod user;
pub mod validation;
