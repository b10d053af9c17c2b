//! Plan display

use colored::Colorize;
use declarative::{DiffSummary, ExecutionError, Operation, ResourceDiff, group_by_type};
use wskit::RESOURCE_TYPE;

use crate::ui;

/// Human name of a resource type
pub fn type_name(resource_type: &str) -> &str {
    match resource_type {
        RESOURCE_TYPE => "JDBC providers",
        other => other,
    }
}

/// One plan line for a diff: symbol, name and what will happen
fn diff_line(diff: &ResourceDiff) -> String {
    let (symbol, state) = match diff.operation {
        Some(Operation::Create) => ("+".green(), "(absent → present)".to_string()),
        Some(Operation::Destroy) => ("-".red(), "(will remove)".to_string()),
        _ => ("○".dimmed(), format!("({})", diff.current)),
    };
    format!("{} {:<30} {}", symbol, diff.resource_id, state.dimmed())
}

/// Display the discovered plan grouped by resource type
pub fn display_plan(results: &[Result<ResourceDiff, ExecutionError>]) {
    if results.is_empty() {
        println!();
        println!("  {} Nothing declared", "ℹ".blue());
        return;
    }

    let diffs: Vec<ResourceDiff> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .cloned()
        .collect();
    let failures: Vec<&ExecutionError> =
        results.iter().filter_map(|r| r.as_ref().err()).collect();
    let summary = DiffSummary::from_results(results);

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Plan".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in group_by_type(&diffs) {
        println!("│ {}", type_name(&resource_type).bold());
        for diff in type_diffs {
            println!("│   {}", diff_line(diff));
        }
        println!("│");
    }

    if !failures.is_empty() {
        println!("│ {}", "Discovery failed".red().bold());
        for failure in &failures {
            println!("│   {} {}", "✗".red(), failure);
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} ({} to create, {} to remove), {} unchanged{}",
        ui::count(summary.total(), "change").bold(),
        summary.additions.to_string().green(),
        summary.removals.to_string().red(),
        summary.unchanged,
        if summary.failed > 0 {
            format!(", {} failed", summary.failed.to_string().red())
        } else {
            String::new()
        }
    );
    println!("└─────────────────────────────────────────────────────┘");
}
