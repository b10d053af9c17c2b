//! Run history
//!
//! Outcome and time of the last reconciliation of each provider, plus totals
//! for recent runs. Only used for reporting: reconciliation always asks
//! WebSphere for the current state. Attributes and credentials are never
//! written here.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{ApplyResult, ExecuteReport, ExecuteSummary, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Number of runs kept in the history
pub const MAX_RUNS: usize = 20;

const HISTORY_FILE: &str = "history.toml";

// ============================================================================
// State Structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunHistory {
    /// Last recorded outcome per provider name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderState>,

    /// Most recent runs, oldest first
    #[serde(default)]
    pub runs: Vec<RunRecord>,

    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordedOutcome {
    Created,
    Destroyed,
    Unchanged,
    Failed,
}

impl RecordedOutcome {
    /// Skipped resources leave no record
    pub fn from_result(result: &ApplyResult) -> Option<Self> {
        match result {
            ApplyResult::Done(Outcome::Created) => Some(Self::Created),
            ApplyResult::Done(Outcome::Destroyed) => Some(Self::Destroyed),
            ApplyResult::Done(Outcome::Unchanged) => Some(Self::Unchanged),
            ApplyResult::Failed { .. } => Some(Self::Failed),
            ApplyResult::Skipped { .. } => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Destroyed => "destroyed",
            Self::Unchanged => "unchanged",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderState {
    pub outcome: RecordedOutcome,
    /// When the outcome was recorded
    pub at: DateTime<Utc>,
    /// Last time the provider was created or destroyed
    pub last_changed: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    /// Declarations file of the run
    pub source: String,
    pub summary: ExecuteSummary,
}

// ============================================================================
// RunHistory Implementation
// ============================================================================

impl Default for RunHistory {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            runs: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl RunHistory {
    /// Get the history file path
    pub fn history_file() -> Result<PathBuf> {
        Ok(paths::state_dir()?.join(HISTORY_FILE))
    }

    /// Load history from the state directory
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::history_file()?)
    }

    /// Save history to the state directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::history_file()?)
    }

    /// Load history from disk, or return default if file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("History file does not exist, starting empty");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file: {}", path.display()))?;
        let history: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse history file: {}", path.display()))?;

        log::debug!("Loaded history from {}", path.display());
        Ok(history)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create state directory: {}", dir.display())
            })?;
        }

        let content =
            toml::to_string_pretty(self).context("Failed to serialize history to TOML")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;

        log::debug!("Saved history to {}", path.display());
        Ok(())
    }

    /// Record the results of an apply run
    pub fn record(&mut self, report: &ExecuteReport, source: &str, started_at: DateTime<Utc>) {
        let now = Utc::now();
        for resource in &report.resources {
            let Some(outcome) = RecordedOutcome::from_result(&resource.result) else {
                continue;
            };
            let changed = matches!(
                outcome,
                RecordedOutcome::Created | RecordedOutcome::Destroyed
            );
            let last_changed = if changed {
                Some(now)
            } else {
                self.providers
                    .get(&resource.id)
                    .and_then(|p| p.last_changed)
            };
            self.providers.insert(
                resource.id.clone(),
                ProviderState {
                    outcome,
                    at: now,
                    last_changed,
                },
            );
        }

        self.runs.push(RunRecord {
            started_at,
            source: source.to_string(),
            summary: report.summary.clone(),
        });
        if self.runs.len() > MAX_RUNS {
            let excess = self.runs.len() - MAX_RUNS;
            self.runs.drain(..excess);
        }
        self.last_updated = now;
    }
}

// ============================================================================
// Tests
// ============================================================================
