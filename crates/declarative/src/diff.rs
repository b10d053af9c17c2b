//! Diff computation for resources

use crate::dispatch::{Executor, transition};
use crate::error::ExecutionError;
use crate::resource::Resource;
use crate::types::{Ensure, Operation};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Observed vs desired state of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// State reported by the external system
    pub current: Ensure,
    /// Declared state
    pub desired: Ensure,
    /// Operation reconciliation would invoke, if any
    pub operation: Option<Operation>,
}

impl ResourceDiff {
    /// Discover the current state of a resource and compare it
    pub fn discover<R, E>(executor: &E, resource: &R) -> Result<Self, ExecutionError>
    where
        R: Resource,
        E: Executor<R>,
    {
        let current = executor
            .discover(resource)
            .map_err(|e| ExecutionError::new(resource.id(), Operation::Discover, e))?;
        Ok(Self::between(resource, current))
    }

    /// Build a diff from an already known current state
    pub fn between<R: Resource>(resource: &R, current: Ensure) -> Self {
        let desired = resource.ensure();
        Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
            operation: transition(current, desired),
        }
    }

    /// Check if reconciliation would change anything
    pub fn is_change(&self) -> bool {
        self.operation.is_some()
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.operation == Some(Operation::Create)
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.operation == Some(Operation::Destroy)
    }
}

/// Discover and diff every resource, keeping per-resource failures
///
/// Discovery runs in a rayon pool of `jobs` threads when `jobs > 1`.
/// Results are returned in input order either way.
pub fn compute_diffs<R, E>(
    executor: &E,
    resources: &[R],
    jobs: usize,
) -> Vec<Result<ResourceDiff, ExecutionError>>
where
    R: Resource,
    E: Executor<R>,
{
    if jobs > 1 && resources.len() > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => {
                return pool.install(|| {
                    resources
                        .par_iter()
                        .map(|r| ResourceDiff::discover(executor, r))
                        .collect()
                });
            }
            Err(e) => {
                log::warn!("Failed to create thread pool, discovering sequentially: {e}");
            }
        }
    }

    resources
        .iter()
        .map(|r| ResourceDiff::discover(executor, r))
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources to destroy
    pub removals: usize,
    /// Number of resources already converged
    pub unchanged: usize,
    /// Number of resources whose state could not be discovered
    pub failed: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diff results
    pub fn from_results(results: &[Result<ResourceDiff, ExecutionError>]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result {
                Ok(diff) if diff.is_addition() => summary.additions += 1,
                Ok(diff) if diff.is_removal() => summary.removals += 1,
                Ok(_) => summary.unchanged += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(
    diffs: &[ResourceDiff],
) -> std::collections::BTreeMap<String, Vec<&ResourceDiff>> {
    let mut groups: std::collections::BTreeMap<String, Vec<&ResourceDiff>> =
        std::collections::BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::{RecordingExecutor, Widget};

    #[test]
    fn test_compute_diffs_keeps_order_and_failures() {
        let executor = RecordingExecutor {
            existing: vec!["b".to_string()],
            failing: vec![("c".to_string(), Operation::Discover)],
            ..Default::default()
        };
        let widgets = vec![
            Widget::new("a", Ensure::Present),
            Widget::new("b", Ensure::Present),
            Widget::new("c", Ensure::Present),
        ];

        let results = compute_diffs(&executor, &widgets, 1);

        assert_eq!(results.len(), 3);
        let a = results[0].as_ref().unwrap();
        assert!(a.is_addition());
        let b = results[1].as_ref().unwrap();
        assert!(!b.is_change());
        assert!(results[2].is_err());

        let summary = DiffSummary::from_results(&results);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_parallel_discovery_keeps_order() {
        let names: Vec<String> = (0..12).map(|i| format!("w{i:02}")).collect();
        let existing: Vec<&str> = names.iter().step_by(2).map(String::as_str).collect();
        let executor = RecordingExecutor::with_existing(&existing);
        let widgets: Vec<Widget> = names
            .iter()
            .map(|n| Widget::new(n, Ensure::Present))
            .collect();

        let results = compute_diffs(&executor, &widgets, 4);

        let ids: Vec<_> = results
            .iter()
            .map(|r| r.as_ref().unwrap().resource_id.clone())
            .collect();
        assert_eq!(ids, names);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().is_addition(), i % 2 == 1);
        }
        assert_eq!(executor.calls().len(), 12);
        assert!(
            executor
                .calls()
                .iter()
                .all(|(_, op)| *op == Operation::Discover)
        );
    }

    #[test]
    fn test_removal_diff() {
        let widget = Widget::new("a", Ensure::Absent);
        let diff = ResourceDiff::between(&widget, Ensure::Present);
        assert!(diff.is_removal());
        assert_eq!(diff.operation, Some(Operation::Destroy));
    }

    #[test]
    fn test_group_by_type() {
        let diffs = vec![
            ResourceDiff::between(&Widget::new("a", Ensure::Present), Ensure::Absent),
            ResourceDiff::between(&Widget::new("b", Ensure::Absent), Ensure::Absent),
        ];
        let groups = group_by_type(&diffs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["widget"].len(), 2);
    }
}
