//! Draggable bottom sheet: animation timeline, snap engine and overlay shell.
//!
//! # Responsibility
//! - Turn raw pan input into snap decisions (`engine`).
//! - Drive position and backdrop opacity over time (`animation`).
//! - Present one open/close lifecycle to screens (`shell`).
//!
//! # Invariants
//! - Nothing in this module returns an error or panics on bad input; anomalies
//!   are logged and the last valid state is kept.

pub mod animation;
pub mod engine;
pub mod shell;
