//! Execution engine - the declarative executor with wasctl's terminal UI

use anyhow::Result;
use colored::Colorize;
use declarative::{
    ApplyResult, AutoConfirm, ExecuteOptions, ExecuteReport, ExecuteSummary, ExecutionPlan,
    Executor, Resource,
};

use crate::progress::{PromptConfirm, TerminalProgress};
use crate::ui;

/// Options for an apply run (adds `yes` and `quiet` to the engine options)
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Discover and report, but change nothing
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Hide the progress bar
    pub quiet: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
            quiet: false,
        }
    }
}

/// Execute the plan with wasctl's UI: plan, confirmation, progress, report
pub fn execute<R, E>(
    plan: &ExecutionPlan<R>,
    executor: &E,
    opts: &ApplyOptions,
) -> Result<ExecuteReport>
where
    R: Resource,
    E: Executor<R>,
{
    let engine_opts = ExecuteOptions {
        dry_run: opts.dry_run,
        jobs: opts.jobs.max(1),
    };
    let mut progress = TerminalProgress::new(opts.quiet);

    let report = if opts.yes {
        declarative::execute(plan, executor, &engine_opts, &mut progress, &mut AutoConfirm)?
    } else {
        declarative::execute(plan, executor, &engine_opts, &mut progress, &mut PromptConfirm)?
    };

    print_results(&report);
    print_summary(&report.summary, opts.dry_run);
    Ok(report)
}

/// Print every resource that was not already converged
fn print_results(report: &ExecuteReport) {
    let notable: Vec<_> = report
        .resources
        .iter()
        .filter(|r| !matches!(r.result, ApplyResult::Done(o) if !o.is_change()))
        .collect();
    if notable.is_empty() {
        return;
    }

    println!();
    for resource in notable {
        println!(
            "  {} {:<30} {}",
            ui::result_symbol(&resource.result),
            resource.id,
            ui::result_label(&resource.result).dimmed()
        );
    }
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, dry_run: bool) {
    println!();
    if dry_run {
        println!("  {} Dry run - no changes made", "ℹ".blue());
    } else if summary.total() == summary.unchanged {
        println!("  {} Already converged", "✓".green().bold());
    } else if summary.is_success() {
        println!("  {} Providers converged", "✓".green().bold());
    } else {
        println!("  {} Applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", ui::count(summary.created, "provider"));
    }
    if summary.destroyed > 0 {
        println!("    • {} destroyed", ui::count(summary.destroyed, "provider"));
    }
    if summary.unchanged > 0 {
        println!("    • {} unchanged", ui::count(summary.unchanged, "provider"));
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", ui::count(summary.skipped, "provider"));
    }
    if summary.failed > 0 {
        println!(
            "    • {} {}",
            ui::count(summary.failed, "provider"),
            "failed".red()
        );
    }
}
