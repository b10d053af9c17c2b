//! `wasctl apply` - create or remove providers to match the declarations

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use declarative::{AutoConfirm, ExecuteOptions, ExecuteReport, NoProgress};
use serde::Serialize;

use super::{RejectedJson, Session, print_json, rejected_json};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, ApplyOptions};
use crate::state::RunHistory;
use crate::ui;

#[derive(Serialize)]
struct ApplyJson<'a> {
    source: String,
    dry_run: bool,
    #[serde(flatten)]
    report: &'a ExecuteReport,
    rejected: Vec<RejectedJson>,
}

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let session = Session::load(ctx)?;
    let plan = session.plan(args.target.as_deref())?;
    let executor = session.executor(&args.wsadmin);
    let jobs = args.jobs.unwrap_or(session.settings.jobs).max(1);
    let started_at = Utc::now();

    let report = if args.json {
        let opts = ExecuteOptions {
            dry_run: args.dry_run,
            jobs,
        };
        declarative::execute(&plan, &executor, &opts, &mut NoProgress, &mut AutoConfirm)?
    } else {
        session.report_rejected();
        let opts = ApplyOptions {
            dry_run: args.dry_run,
            jobs,
            yes: args.yes,
            quiet: ctx.quiet,
        };
        engine::execute(&plan, &executor, &opts)?
    };

    if !args.dry_run {
        record_history(&report, &session.source_display(), started_at);
    }

    if args.json {
        print_json(&ApplyJson {
            source: session.source_display(),
            dry_run: args.dry_run,
            report: &report,
            rejected: rejected_json(&session.batch),
        })?;
    }

    if !report.summary.is_success() {
        bail!(
            "{} failed",
            ui::count(report.summary.failed, "provider")
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

/// Record outcomes; a history failure never fails the run
fn record_history(report: &ExecuteReport, source: &str, started_at: DateTime<Utc>) {
    let result = RunHistory::load().and_then(|mut history| {
        history.record(report, source, started_at);
        history.save()
    });
    if let Err(e) = result {
        ui::warn(&format!("Could not record run history: {e:#}"));
    }
}
