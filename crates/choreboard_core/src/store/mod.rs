//! In-memory household store.
//!
//! # Responsibility
//! - Own the user, task and completion collections for the process lifetime.
//! - Validate mutations and hand out copies so callers never alias state.
//!
//! # Invariants
//! - All state changes go through `TaskStore` mutation methods.
//! - Unknown ids are an expected outcome (`None`/`false`/empty), not an error.
//! - Time is read through `Clock`, once per operation.

pub mod clock;
pub mod task_store;
