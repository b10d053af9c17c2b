use colored::{ColoredString, Colorize};
use declarative::{ApplyResult, Outcome};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Symbol for the result of one resource
pub fn result_symbol(result: &ApplyResult) -> ColoredString {
    match result {
        ApplyResult::Done(Outcome::Unchanged) => "○".dimmed(),
        ApplyResult::Done(Outcome::Created) => "+".green(),
        ApplyResult::Done(Outcome::Destroyed) => "-".red(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

/// Short description of the result of one resource
pub fn result_label(result: &ApplyResult) -> String {
    match result {
        ApplyResult::Done(outcome) => outcome.to_string(),
        ApplyResult::Failed { error } => format!("failed: {error}"),
        ApplyResult::Skipped { reason } => format!("skipped ({reason})"),
    }
}

/// `1 provider`, `2 providers`
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Tests
// ============================================================================
