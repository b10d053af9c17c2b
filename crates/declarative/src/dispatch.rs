//! Reconciler dispatch - decide whether and which executor operation to call
//!
//! The ensure state machine has two states. Every (observed, desired) pair
//! maps through [`TRANSITIONS`] to at most one operation.

use crate::error::ExecutionError;
use crate::resource::Resource;
use crate::types::{Ensure, ObservedState, Operation, Outcome};

/// External collaborator that performs the actual work for a resource type
///
/// Calls are blocking. Timeouts, retries and how the underlying tool is
/// invoked are the executor's business.
pub trait Executor<R: Resource>: Send + Sync {
    /// Failure reported by the executor, surfaced verbatim
    type Error: std::error::Error + Send + Sync + 'static;

    /// Ask the external system whether the resource exists
    fn discover(&self, resource: &R) -> Result<Ensure, Self::Error>;

    /// Create the resource
    fn create(&self, resource: &R) -> Result<(), Self::Error>;

    /// Destroy the resource
    fn destroy(&self, resource: &R) -> Result<(), Self::Error>;
}

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Ensure,
    pub to: Ensure,
    pub operation: Option<Operation>,
}

/// Every transition of the ensure state machine
pub const TRANSITIONS: [Transition; 4] = [
    Transition {
        from: Ensure::Absent,
        to: Ensure::Present,
        operation: Some(Operation::Create),
    },
    Transition {
        from: Ensure::Present,
        to: Ensure::Absent,
        operation: Some(Operation::Destroy),
    },
    Transition {
        from: Ensure::Present,
        to: Ensure::Present,
        operation: None,
    },
    Transition {
        from: Ensure::Absent,
        to: Ensure::Absent,
        operation: None,
    },
];

/// Look up the operation needed to move from `current` to `desired`
pub fn transition(current: Ensure, desired: Ensure) -> Option<Operation> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == current && t.to == desired)
        .and_then(|t| t.operation)
}

/// Resolve an observed state, running discovery when it is unknown
pub fn resolve_state<R, E>(
    executor: &E,
    resource: &R,
    observed: ObservedState,
) -> Result<Ensure, ExecutionError>
where
    R: Resource,
    E: Executor<R>,
{
    if let Some(state) = observed.known() {
        return Ok(state);
    }

    log::debug!("Discovering current state of {}", resource.id());
    executor
        .discover(resource)
        .map_err(|e| ExecutionError::new(resource.id(), Operation::Discover, e))
}

/// Converge one resource towards its desired ensure state
///
/// Performs zero executor calls when the observed state already matches.
/// A failure is returned as-is; nothing is retried or rolled back.
pub fn reconcile<R, E>(
    executor: &E,
    resource: &R,
    observed: ObservedState,
) -> Result<Outcome, ExecutionError>
where
    R: Resource,
    E: Executor<R>,
{
    let current = resolve_state(executor, resource, observed)?;
    let desired = resource.ensure();

    let result = match transition(current, desired) {
        Some(Operation::Create) => executor
            .create(resource)
            .map(|()| Outcome::Created)
            .map_err(|e| ExecutionError::new(resource.id(), Operation::Create, e)),
        Some(Operation::Destroy) => executor
            .destroy(resource)
            .map(|()| Outcome::Destroyed)
            .map_err(|e| ExecutionError::new(resource.id(), Operation::Destroy, e)),
        Some(Operation::Discover) | None => {
            log::debug!("{} already {}", resource.id(), desired);
            return Ok(Outcome::Unchanged);
        }
    };

    let outcome = result?;
    log::info!("{} {}", resource.id(), outcome);
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use thiserror::Error;

    #[derive(Debug)]
    pub struct Widget {
        pub name: String,
        pub ensure: Ensure,
    }

    impl Widget {
        pub fn new(name: &str, ensure: Ensure) -> Self {
            Self {
                name: name.to_string(),
                ensure,
            }
        }
    }

    impl Resource for Widget {
        fn id(&self) -> String {
            self.name.clone()
        }

        fn description(&self) -> String {
            format!("Widget {}", self.name)
        }

        fn resource_type(&self) -> &'static str {
            "widget"
        }

        fn ensure(&self) -> Ensure {
            self.ensure
        }
    }

    #[derive(Debug, Error)]
    #[error("tool exited with status 1")]
    pub struct ToolFailed;

    /// Records every call; fails operations listed in `failing`
    #[derive(Default)]
    pub struct RecordingExecutor {
        pub existing: Vec<String>,
        pub failing: Vec<(String, Operation)>,
        pub calls: Mutex<Vec<(String, Operation)>>,
    }

    impl RecordingExecutor {
        pub fn with_existing(names: &[&str]) -> Self {
            Self {
                existing: names.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(String, Operation)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, resource: &Widget, op: Operation) -> Result<(), ToolFailed> {
            self.calls.lock().unwrap().push((resource.name.clone(), op));
            if self.failing.contains(&(resource.name.clone(), op)) {
                return Err(ToolFailed);
            }
            Ok(())
        }
    }

    impl Executor<Widget> for RecordingExecutor {
        type Error = ToolFailed;

        fn discover(&self, resource: &Widget) -> Result<Ensure, ToolFailed> {
            self.record(resource, Operation::Discover)?;
            if self.existing.contains(&resource.name) {
                Ok(Ensure::Present)
            } else {
                Ok(Ensure::Absent)
            }
        }

        fn create(&self, resource: &Widget) -> Result<(), ToolFailed> {
            self.record(resource, Operation::Create)
        }

        fn destroy(&self, resource: &Widget) -> Result<(), ToolFailed> {
            self.record(resource, Operation::Destroy)
        }
    }

    #[test]
    fn test_transition_table_is_total() {
        for from in [Ensure::Present, Ensure::Absent] {
            for to in [Ensure::Present, Ensure::Absent] {
                let rows = TRANSITIONS
                    .iter()
                    .filter(|t| t.from == from && t.to == to)
                    .count();
                assert_eq!(rows, 1, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_transition_lookup() {
        assert_eq!(
            transition(Ensure::Absent, Ensure::Present),
            Some(Operation::Create)
        );
        assert_eq!(
            transition(Ensure::Present, Ensure::Absent),
            Some(Operation::Destroy)
        );
        assert_eq!(transition(Ensure::Present, Ensure::Present), None);
        assert_eq!(transition(Ensure::Absent, Ensure::Absent), None);
    }

    #[test]
    fn test_present_to_present_makes_no_calls() {
        let executor = RecordingExecutor::default();
        let widget = Widget::new("a", Ensure::Present);

        let outcome = reconcile(&executor, &widget, ObservedState::Present).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_absent_to_present_creates() {
        let executor = RecordingExecutor::default();
        let widget = Widget::new("a", Ensure::Present);

        let outcome = reconcile(&executor, &widget, ObservedState::Absent).unwrap();

        assert_eq!(outcome, Outcome::Created);
        assert_eq!(executor.calls(), vec![("a".to_string(), Operation::Create)]);
    }

    #[test]
    fn test_present_to_absent_destroys() {
        let executor = RecordingExecutor::default();
        let widget = Widget::new("a", Ensure::Absent);

        let outcome = reconcile(&executor, &widget, ObservedState::Present).unwrap();

        assert_eq!(outcome, Outcome::Destroyed);
        assert_eq!(executor.calls(), vec![("a".to_string(), Operation::Destroy)]);
    }

    #[test]
    fn test_absent_to_absent_is_noop() {
        let executor = RecordingExecutor::default();
        let widget = Widget::new("a", Ensure::Absent);

        let outcome = reconcile(&executor, &widget, ObservedState::Absent).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_unknown_runs_discovery_first() {
        let executor = RecordingExecutor::with_existing(&["a"]);
        let widget = Widget::new("a", Ensure::Absent);

        let outcome = reconcile(&executor, &widget, ObservedState::Unknown).unwrap();

        assert_eq!(outcome, Outcome::Destroyed);
        assert_eq!(
            executor.calls(),
            vec![
                ("a".to_string(), Operation::Discover),
                ("a".to_string(), Operation::Destroy),
            ]
        );
    }

    #[test]
    fn test_executor_failure_carries_identity() {
        let executor = RecordingExecutor {
            failing: vec![("a".to_string(), Operation::Create)],
            ..Default::default()
        };
        let widget = Widget::new("a", Ensure::Present);

        let err = reconcile(&executor, &widget, ObservedState::Absent).unwrap_err();

        assert_eq!(err.resource, "a");
        assert_eq!(err.operation, Operation::Create);
        assert!(err.cause::<ToolFailed>().is_some());
    }

    #[test]
    fn test_discovery_failure_is_reported_as_discover() {
        let executor = RecordingExecutor {
            failing: vec![("a".to_string(), Operation::Discover)],
            ..Default::default()
        };
        let widget = Widget::new("a", Ensure::Present);

        let err = reconcile(&executor, &widget, ObservedState::Unknown).unwrap_err();

        assert_eq!(err.operation, Operation::Discover);
        assert_eq!(executor.calls().len(), 1);
    }
}
