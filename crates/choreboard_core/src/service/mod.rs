//! Use-case services above the store.
//!
//! # Responsibility
//! - Hold caller-side policies the store deliberately does not enforce.
//! - Give screens one entry point per flow.

pub mod household_service;
