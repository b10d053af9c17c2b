//! Execution engine - discovers, confirms and reconciles a plan

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diff::{ResourceDiff, compute_diffs};
use crate::dispatch::{Executor, reconcile};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, Outcome};
use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

/// Result for one resource of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub id: String,
    pub description: String,
    pub result: ApplyResult,
}

/// Per-resource results in declaration order, plus totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteReport {
    pub resources: Vec<ResourceReport>,
    pub summary: ExecuteSummary,
}

impl ExecuteReport {
    fn from_results(resources: Vec<ResourceReport>) -> Self {
        let mut summary = ExecuteSummary::default();
        for report in &resources {
            summary.add_result(&report.result);
        }
        Self { resources, summary }
    }

    /// Resources that failed, in declaration order
    pub fn failures(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources
            .iter()
            .filter(|r| matches!(r.result, ApplyResult::Failed { .. }))
    }
}

/// Execute a plan with the given options and callbacks
///
/// Every resource is discovered first. Resources that need a change are
/// confirmed once as a group and then reconciled. Both phases run in parallel
/// when `opts.jobs > 1`. A failing resource never stops the others.
///
/// # Errors
/// Only infrastructure failures are returned: the confirm callback failing or
/// the thread pool failing to start. Executor failures end up in the report.
pub fn execute<R, E, P, C>(
    plan: &ExecutionPlan<R>,
    executor: &E,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    R: Resource,
    E: Executor<R>,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(executor, &plan.resources, opts.jobs);
    progress.on_plan(&diffs);

    let mut slots: Vec<Option<ApplyResult>> = Vec::with_capacity(diffs.len());
    let mut pending: Vec<(usize, &R, &ResourceDiff)> = Vec::new();
    for (index, (resource, diff)) in plan.resources.iter().zip(&diffs).enumerate() {
        match diff {
            Ok(d) if d.is_change() => {
                slots.push(None);
                pending.push((index, resource, d));
            }
            Ok(_) => slots.push(Some(ApplyResult::Done(Outcome::Unchanged))),
            Err(e) => slots.push(Some(ApplyResult::Failed {
                error: e.to_string(),
            })),
        }
    }

    if !pending.is_empty() {
        let skip_reason = if opts.dry_run {
            Some("dry run")
        } else if !confirm.confirm(&format!("Apply {} change(s)?", pending.len()))? {
            Some("declined")
        } else {
            None
        };

        if let Some(reason) = skip_reason {
            log::info!("Skipping {} change(s): {}", pending.len(), reason);
            for (index, _, _) in &pending {
                slots[*index] = Some(ApplyResult::Skipped {
                    reason: reason.to_string(),
                });
            }
        } else {
            progress.on_batch_start(pending.len());
            for (index, result) in apply_pending(&pending, executor, opts.jobs, progress)? {
                slots[index] = Some(result);
            }
            progress.on_batch_complete();
        }
    }

    let resources = plan
        .resources
        .iter()
        .zip(slots)
        .map(|(resource, slot)| ResourceReport {
            id: resource.id(),
            description: resource.description(),
            result: slot.unwrap_or_else(|| ApplyResult::Skipped {
                reason: "not reached".to_string(),
            }),
        })
        .collect();

    Ok(ExecuteReport::from_results(resources))
}

/// Reconcile resources that need a change
///
/// Resources that can run in parallel go through a rayon pool first; the
/// rest follow one at a time.
fn apply_pending<R, E, P>(
    pending: &[(usize, &R, &ResourceDiff)],
    executor: &E,
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<(usize, ApplyResult)>>
where
    R: Resource,
    E: Executor<R>,
    P: ProgressCallback,
{
    let (parallel, sequential): (Vec<_>, Vec<_>) = pending
        .iter()
        .partition(|(_, resource, _)| jobs > 1 && resource.can_parallelize());

    let mut results = Vec::with_capacity(pending.len());

    if parallel.len() > 1 {
        results.extend(execute_parallel(&parallel, executor, jobs, progress)?);
    } else {
        results.extend(execute_sequential(&parallel, executor, progress));
    }
    results.extend(execute_sequential(&sequential, executor, progress));

    results.sort_by_key(|(index, _)| *index);
    Ok(results)
}

fn execute_sequential<R, E, P>(
    pending: &[&(usize, &R, &ResourceDiff)],
    executor: &E,
    progress: &mut P,
) -> Vec<(usize, ApplyResult)>
where
    R: Resource,
    E: Executor<R>,
    P: ProgressCallback,
{
    pending
        .iter()
        .map(|(index, resource, diff)| {
            progress.on_resource_start(&diff.resource_id, &diff.description);
            let result = apply_resource(executor, *resource, diff);
            progress.on_resource_complete(&diff.resource_id, &result);
            (*index, result)
        })
        .collect()
}

/// Reconcile resources in parallel using rayon
fn execute_parallel<R, E, P>(
    pending: &[&(usize, &R, &ResourceDiff)],
    executor: &E,
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<(usize, ApplyResult)>>
where
    R: Resource,
    E: Executor<R>,
    P: ProgressCallback,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {e}"))?;

    // The progress callback is not shared across threads, so completions are
    // reported after the pool finishes.
    let results: Vec<(usize, ApplyResult)> = pool.install(|| {
        pending
            .par_iter()
            .map(|(index, resource, diff)| (*index, apply_resource(executor, *resource, diff)))
            .collect()
    });

    for ((_, _, diff), (_, result)) in pending.iter().zip(&results) {
        progress.on_resource_complete(&diff.resource_id, result);
    }

    Ok(results)
}

/// Reconcile a single resource from its discovered state
fn apply_resource<R, E>(executor: &E, resource: &R, diff: &ResourceDiff) -> ApplyResult
where
    R: Resource,
    E: Executor<R>,
{
    match reconcile(executor, resource, diff.current.into()) {
        Ok(outcome) => ApplyResult::Done(outcome),
        Err(e) => {
            log::warn!("{e}");
            ApplyResult::Failed {
                error: e.to_string(),
            }
        }
    }
}
