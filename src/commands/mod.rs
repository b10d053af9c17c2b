//! Command implementations

pub mod apply;
pub mod plan;
pub mod schema;
pub mod status;
pub mod validate;

use anyhow::{Context as AnyhowContext, Result, bail};
use declarative::ExecutionPlan;
use serde::Serialize;
use std::path::PathBuf;
use wskit::{Batch, JdbcProvider, Rejected, RetryConfig, RunAs, WsadminExecutor};

use crate::Context;
use crate::cli::WsadminArgs;
use crate::config::{self, Settings};
use crate::declarations;
use crate::ui;

/// Settings and built declarations of one invocation
pub struct Session {
    pub settings: Settings,
    /// Declarations file
    pub source: PathBuf,
    pub batch: Batch,
}

impl Session {
    /// Load settings and declarations named by the command line
    ///
    /// Invalid declarations end up in `batch.rejected`; duplicate names
    /// fail the whole load.
    pub fn load(ctx: &Context) -> Result<Self> {
        let settings_path = match &ctx.config {
            Some(path) => path.clone(),
            None => config::settings_path()?,
        };
        let settings = Settings::load(&settings_path)?;

        let source = match &ctx.file {
            Some(path) => path.clone(),
            None => settings.declarations_path()?,
        };
        let declared = declarations::load(&source, &wskit::registry())?;
        let batch = Batch::build(declared)
            .with_context(|| format!("Cannot reconcile {}", source.display()))?;

        log::info!(
            "{} valid, {} rejected in {}",
            batch.providers.len(),
            batch.rejected.len(),
            source.display()
        );
        Ok(Self {
            settings,
            source,
            batch,
        })
    }

    /// Valid providers matching `target`
    pub fn plan(&self, target: Option<&str>) -> Result<ExecutionPlan<JdbcProvider>> {
        let plan = ExecutionPlan::new(self.batch.providers.clone()).filter_by_target(target);
        if let Some(target) = target
            && plan.is_empty()
        {
            bail!("No declared provider matches '{target}'");
        }
        Ok(plan)
    }

    /// wsadmin executor from settings, with command-line overrides
    pub fn executor(&self, args: &WsadminArgs) -> WsadminExecutor {
        let executor = WsadminExecutor::new()
            .run_as(self.run_as(args))
            .retry(self.retry(args));
        match self.settings.script_dir() {
            Some(dir) => executor.script_dir(dir),
            None => executor,
        }
    }

    fn run_as(&self, args: &WsadminArgs) -> RunAs {
        args.run_as.unwrap_or(self.settings.run_as)
    }

    fn retry(&self, args: &WsadminArgs) -> RetryConfig {
        let mut retry = self.settings.retry.to_config();
        if let Some(attempts) = args.retries {
            retry.max_attempts = attempts.max(1);
        }
        retry
    }

    /// Print rejected declarations
    pub fn report_rejected(&self) {
        for rejected in &self.batch.rejected {
            ui::error(&format!("{}: {}", rejected.title, rejected.error));
        }
    }

    pub fn source_display(&self) -> String {
        self.source.display().to_string()
    }
}

/// JSON form of a rejected declaration
#[derive(Debug, Serialize)]
pub struct RejectedJson {
    pub title: String,
    pub field: String,
    pub error: String,
}

impl From<&Rejected> for RejectedJson {
    fn from(rejected: &Rejected) -> Self {
        Self {
            title: rejected.title.clone(),
            field: rejected.error.field().to_string(),
            error: rejected.error.to_string(),
        }
    }
}

pub fn rejected_json(batch: &Batch) -> Vec<RejectedJson> {
    batch.rejected.iter().map(RejectedJson::from).collect()
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}
