//! Execution engine for wasctl
//!
//! The engine orchestrates:
//! 1. Diffing - Discover current vs declared state through wsadmin
//! 2. Display - Show the plan grouped by resource type
//! 3. Executing - Confirm, then apply changes with parallelism

pub mod differ;
pub mod executor;

pub use executor::{ApplyOptions, execute};
