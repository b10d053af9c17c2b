//! Resource trait for declarative state management
//!
//! A Resource is a validated declaration of something that should be
//! present or absent in an external system.

use crate::types::Ensure;
use std::fmt;

/// Core trait for declared resources
///
/// Implementors are immutable records built and validated before any
/// reconciliation happens. The trait only exposes identity and the desired
/// ensure state; how the resource is created or destroyed belongs to an
/// [`Executor`](crate::Executor).
///
/// # Example
///
/// ```
/// use declarative::{Ensure, Resource};
///
/// #[derive(Debug)]
/// struct Datasource {
///     name: String,
///     ensure: Ensure,
/// }
///
/// impl Resource for Datasource {
///     fn id(&self) -> String {
///         self.name.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Datasource {}", self.name)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "datasource"
///     }
///
///     fn ensure(&self) -> Ensure {
///         self.ensure
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource within its type
    fn id(&self) -> String;

    /// Human-readable description of what this resource manages
    fn description(&self) -> String;

    /// Resource type category, used for grouping and filtering
    fn resource_type(&self) -> &'static str;

    /// Desired lifecycle state
    fn ensure(&self) -> Ensure;

    /// Whether this resource can be reconciled in parallel with others
    fn can_parallelize(&self) -> bool {
        true
    }
}
