//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! discovering current state, and converging an external system to match.
//! It never talks to that system itself: all work is delegated to an
//! [`Executor`].
//!
//! ## Core Concepts
//!
//! - **Resource**: an immutable, validated declaration with an [`Ensure`] state
//! - **ObservedState**: what the external system reports (or `Unknown`)
//! - **Transition table**: `(observed, desired)` to at most one [`Operation`]
//! - **Executor**: performs discovery, creation and destruction
//! - **ExecutionPlan**: the resources a run covers, in declaration order
//!
//! ## Example
//!
//! ```
//! use declarative::{Ensure, Executor, ObservedState, Outcome, Resource, reconcile};
//!
//! #[derive(Debug)]
//! struct Datasource { name: String, ensure: Ensure }
//!
//! impl Resource for Datasource {
//!     fn id(&self) -> String { self.name.clone() }
//!     fn description(&self) -> String { format!("Datasource {}", self.name) }
//!     fn resource_type(&self) -> &'static str { "datasource" }
//!     fn ensure(&self) -> Ensure { self.ensure }
//! }
//!
//! struct Noop;
//!
//! impl Executor<Datasource> for Noop {
//!     type Error = std::io::Error;
//!     fn discover(&self, _: &Datasource) -> Result<Ensure, Self::Error> { Ok(Ensure::Absent) }
//!     fn create(&self, _: &Datasource) -> Result<(), Self::Error> { Ok(()) }
//!     fn destroy(&self, _: &Datasource) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! let ds = Datasource { name: "orders".into(), ensure: Ensure::Present };
//! let outcome = reconcile(&Noop, &ds, ObservedState::Unknown).unwrap();
//! assert_eq!(outcome, Outcome::Created);
//! ```
//!
//! ## Callbacks
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use dispatch::{Executor, TRANSITIONS, Transition, reconcile, resolve_state, transition};
pub use error::{BoxError, ExecutionError};
pub use executor::{ExecuteReport, ResourceReport, execute};
pub use planner::{ExecutionPlan, matches_target, target_matches};
pub use resource::Resource;
pub use types::{
    ApplyResult, CommandOutput, Ensure, ExecuteOptions, ExecuteSummary, ObservedState, Operation,
    Outcome, ParseEnsureError,
};
