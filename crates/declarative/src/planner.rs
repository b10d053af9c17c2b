//! Execution planner - selects which resources a run covers

use crate::resource::Resource;

/// The resources a run will reconcile, in declaration order
#[derive(Debug)]
pub struct ExecutionPlan<R> {
    pub resources: Vec<R>,
}

impl<R: Resource> ExecutionPlan<R> {
    /// Create a plan from resources in declaration order
    pub fn new(resources: Vec<R>) -> Self {
        Self { resources }
    }

    /// Filter plan to only include resources matching a predicate
    #[must_use]
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool,
    {
        Self {
            resources: self.resources.into_iter().filter(|r| predicate(r)).collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "type", "type.name" (exact) or a bare name substring.
    #[must_use]
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => self.filter(|r| matches_target(r, t)),
        }
    }

    /// Total number of resources in the plan
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterate over resources in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.resources.iter()
    }
}

impl<R> Default for ExecutionPlan<R> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
        }
    }
}

/// Check if a resource matches a target pattern
pub fn matches_target<R: Resource>(resource: &R, target: &str) -> bool {
    target_matches(resource.resource_type(), &resource.id(), target)
}

/// Check if a resource identified by type and id matches a target pattern
///
/// Targets are a type (`jdbc_provider`), a qualified name
/// (`jdbc_provider.oracleJDBC`, matched exactly) or a bare name substring.
/// Names may themselves contain dots, so the type prefix is stripped rather
/// than splitting the target.
pub fn target_matches(resource_type: &str, id: &str, target: &str) -> bool {
    if target == resource_type {
        return true;
    }

    match target
        .strip_prefix(resource_type)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(name) => id == name,
        None => id.contains(target),
    }
}
