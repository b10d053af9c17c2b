//! Terminal progress and confirmation for the declarative engine.

use anyhow::Result;
use declarative::{ApplyResult, ConfirmCallback, ExecutionError, ProgressCallback, ResourceDiff};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::differ;
use crate::ui;

/// Shows the plan once discovery is done, then a bar while changes apply
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_plan(&mut self, diffs: &[Result<ResourceDiff, ExecutionError>]) {
        differ::display_plan(diffs);
    }

    fn on_batch_start(&mut self, count: usize) {
        let pb = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(count as u64)
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.bar = Some(pb);
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(id.to_string());
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if let Some(pb) = &self.bar {
            pb.set_message(format!("{} {}", ui::result_symbol(result), id));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

/// Asks on the terminal before anything changes
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        println!();
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
