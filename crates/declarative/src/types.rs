//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Output;
use std::str::FromStr;
use thiserror::Error;

/// Desired lifecycle state of a managed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// Resource should exist
    #[default]
    Present,
    /// Resource should not exist
    Absent,
}

impl Ensure {
    /// All accepted spellings, in declaration order
    pub const VALUES: &'static [&'static str] = &["present", "absent"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`Ensure`] from text fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ensure value '{0}', expected one of: present, absent")]
pub struct ParseEnsureError(pub String);

impl FromStr for Ensure {
    type Err = ParseEnsureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(ParseEnsureError(other.to_string())),
        }
    }
}

/// State reported by the external system
///
/// `Unknown` means the caller has not asked yet; reconciliation resolves it
/// through the executor's discovery step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedState {
    Present,
    Absent,
    Unknown,
}

impl ObservedState {
    /// The known state, if any
    pub fn known(self) -> Option<Ensure> {
        match self {
            Self::Present => Some(Ensure::Present),
            Self::Absent => Some(Ensure::Absent),
            Self::Unknown => None,
        }
    }
}

impl From<Ensure> for ObservedState {
    fn from(state: Ensure) -> Self {
        match state {
            Ensure::Present => Self::Present,
            Ensure::Absent => Self::Absent,
        }
    }
}

impl fmt::Display for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Operation delegated to an executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Discover,
    Create,
    Destroy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover => f.write_str("discover"),
            Self::Create => f.write_str("create"),
            Self::Destroy => f.write_str("destroy"),
        }
    }
}

/// Action taken for a single resource by a successful reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Destroyed,
    Unchanged,
}

impl Outcome {
    /// Check if the outcome represents a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Destroyed => f.write_str("destroyed"),
            Self::Unchanged => f.write_str("unchanged"),
        }
    }
}

/// Result of applying a resource inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Reconciliation finished
    Done(Outcome),
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Done(outcome) if outcome.is_change())
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub destroyed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.destroyed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.destroyed + self.unchanged + self.skipped + self.failed
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ExecuteSummary) {
        self.created += other.created;
        self.destroyed += other.destroyed;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::Done(Outcome::Created) => self.created += 1,
            ApplyResult::Done(Outcome::Destroyed) => self.destroyed += 1,
            ApplyResult::Done(Outcome::Unchanged) => self.unchanged += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs; 1 reconciles sequentially
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
        }
    }
}

/// Captured output of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub success: bool,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
            success: output.status.success(),
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Exit code rendered for messages ("signal" when there is none)
    pub fn code_str(&self) -> String {
        self.code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string())
    }
}
