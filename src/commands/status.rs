//! `wasctl status` - outcomes recorded by previous apply runs
//!
//! This never contacts WebSphere; use `wasctl plan` for the live state.

use anyhow::Result;
use colored::Colorize;
use declarative::target_matches;
use serde::Serialize;
use std::collections::BTreeMap;
use wskit::RESOURCE_TYPE;

use super::{Session, print_json};
use crate::Context;
use crate::cli::StatusArgs;
use crate::state::{ProviderState, RecordedOutcome, RunHistory, RunRecord};
use crate::ui;

#[derive(Serialize)]
struct StatusJson<'a> {
    providers: BTreeMap<&'a str, &'a ProviderState>,
    never_applied: Vec<String>,
    runs: &'a [RunRecord],
}

pub fn run(ctx: &Context, args: &StatusArgs) -> Result<()> {
    let history = RunHistory::load()?;
    let target = args.target.as_deref();
    let matches = |name: &str| target.is_none_or(|t| target_matches(RESOURCE_TYPE, name, t));

    let providers: BTreeMap<&str, &ProviderState> = history
        .providers
        .iter()
        .filter(|(name, _)| matches(name))
        .map(|(name, state)| (name.as_str(), state))
        .collect();
    let never_applied: Vec<String> = declared_names(ctx)
        .into_iter()
        .filter(|name| matches(name) && !history.providers.contains_key(name))
        .collect();
    let runs = recent(&history.runs, args.runs);

    if args.json {
        return print_json(&StatusJson {
            providers,
            never_applied,
            runs,
        });
    }

    ui::header("Provider status");
    if providers.is_empty() && never_applied.is_empty() {
        ui::info("No recorded runs");
    }
    for (name, state) in &providers {
        let changed = state
            .last_changed
            .map(|at| format!(" (changed {})", at.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default();
        println!(
            "  {} {:<30} {:<10} {}{}",
            outcome_symbol(state.outcome),
            name,
            state.outcome.as_str(),
            state.at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed(),
            changed.dimmed()
        );
    }
    for name in &never_applied {
        println!("  {} {:<30} {}", "?".dimmed(), name, "never applied".dimmed());
    }

    if !runs.is_empty() {
        ui::section("Recent runs");
        for run in runs.iter().rev() {
            let s = &run.summary;
            println!(
                "  {}  {} created, {} destroyed, {} unchanged, {} skipped, {} failed  {}",
                run.started_at.format("%Y-%m-%d %H:%M UTC"),
                s.created,
                s.destroyed,
                s.unchanged,
                s.skipped,
                s.failed,
                run.source.dimmed()
            );
        }
    }

    Ok(())
}

/// Names declared in the current declarations file, if it loads
fn declared_names(ctx: &Context) -> Vec<String> {
    match Session::load(ctx) {
        Ok(session) => session
            .batch
            .providers
            .into_iter()
            .map(|p| p.name)
            .collect(),
        Err(e) => {
            log::debug!("Declarations unavailable for status: {e:#}");
            Vec::new()
        }
    }
}

/// The last `n` runs, oldest first
fn recent(runs: &[RunRecord], n: usize) -> &[RunRecord] {
    &runs[runs.len().saturating_sub(n)..]
}

fn outcome_symbol(outcome: RecordedOutcome) -> colored::ColoredString {
    match outcome {
        RecordedOutcome::Created => "+".green(),
        RecordedOutcome::Destroyed => "-".red(),
        RecordedOutcome::Unchanged => "○".dimmed(),
        RecordedOutcome::Failed => "✗".red(),
    }
}
