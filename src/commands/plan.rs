//! `wasctl plan` - discover current state and show what apply would change

use anyhow::{Result, bail};
use declarative::{DiffSummary, ResourceDiff, compute_diffs};
use serde::Serialize;

use super::{RejectedJson, Session, print_json, rejected_json};
use crate::Context;
use crate::cli::PlanArgs;
use crate::engine::differ;
use crate::ui;

#[derive(Serialize)]
struct DiscoveryFailure {
    resource: String,
    error: String,
}

#[derive(Serialize)]
struct PlanJson {
    source: String,
    diffs: Vec<ResourceDiff>,
    failures: Vec<DiscoveryFailure>,
    summary: DiffSummary,
    rejected: Vec<RejectedJson>,
}

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let session = Session::load(ctx)?;
    let plan = session.plan(args.target.as_deref())?;
    let executor = session.executor(&args.wsadmin);

    let results = compute_diffs(&executor, &plan.resources, session.settings.jobs.max(1));
    let summary = DiffSummary::from_results(&results);

    if args.json {
        let mut diffs = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(diff) => diffs.push(diff),
                Err(e) => failures.push(DiscoveryFailure {
                    resource: e.resource.clone(),
                    error: e.to_string(),
                }),
            }
        }
        print_json(&PlanJson {
            source: session.source_display(),
            diffs,
            failures,
            summary: summary.clone(),
            rejected: rejected_json(&session.batch),
        })?;
    } else {
        session.report_rejected();
        differ::display_plan(&results);
    }

    if summary.failed > 0 {
        bail!(
            "Could not discover {}",
            ui::count(summary.failed, "provider")
        );
    }
    if !session.batch.is_valid() {
        bail!(
            "{} invalid",
            ui::count(session.batch.rejected.len(), "declaration")
        );
    }
    Ok(())
}
