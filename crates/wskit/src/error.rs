//! Error types for declarations and wsadmin operations.
//!
//! Validation and declaration errors are raised before anything touches the
//! application server. wsadmin errors are categorized from the tool's output
//! so callers can decide what to retry and what to tell the operator.

use std::path::PathBuf;
use thiserror::Error;

/// A declared attribute value was rejected.
///
/// Errors name the field and the offending value. Sensitive fields carry no
/// validation rule, so their values never reach these messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Value contains characters outside `[-0-9A-Za-z._]`
    #[error("invalid {field} '{value}': only letters, digits, '-', '.' and '_' are allowed")]
    InvalidFormat {
        /// Attribute name
        field: String,
        /// Rejected value
        value: String,
    },

    /// Value is not an absolute filesystem path
    #[error("invalid {field} '{value}': must be an absolute path")]
    InvalidPath {
        /// Attribute name
        field: String,
        /// Rejected value
        value: String,
    },

    /// Value is not one of the allowed choices
    #[error("invalid {field} '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnum {
        /// Attribute name
        field: String,
        /// Rejected value
        value: String,
        /// Accepted values
        expected: Vec<String>,
    },

    /// A required attribute was not given and has no default
    #[error("missing required attribute '{field}'")]
    MissingRequiredField {
        /// Attribute name
        field: String,
    },

    /// The attribute is not part of the resource schema
    #[error("unknown attribute '{field}'")]
    UnknownAttribute {
        /// Attribute name as written in the declaration
        field: String,
    },
}

impl ValidationError {
    /// Name of the attribute the error is about.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidFormat { field, .. }
            | Self::InvalidPath { field, .. }
            | Self::InvalidEnum { field, .. }
            | Self::MissingRequiredField { field }
            | Self::UnknownAttribute { field } => field,
        }
    }
}

/// A set of declarations cannot be reconciled together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// Two declarations resolve to the same provider name
    #[error("duplicate {resource_type} name '{name}' (declared by '{first}' and '{second}')")]
    DuplicateName {
        /// Resource type of both declarations
        resource_type: String,
        /// Name both declarations resolve to
        name: String,
        /// Title of the first declaration
        first: String,
        /// Title of the second declaration
        second: String,
    },
}

/// Categories of wsadmin failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Deployment manager unreachable (transient, retryable)
    Connection,
    /// Credentials rejected by administrative security
    Authentication,
    /// The Jython script raised an exception
    Script,
    /// wsadmin.sh is missing under the profile
    ToolNotFound,
    /// Declaration cannot be mapped to a containment path
    Scope,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Connection => "Cannot connect to the deployment manager",
            Self::Authentication => "wsadmin authentication failed",
            Self::Script => "wsadmin script failed",
            Self::ToolNotFound => "wsadmin not found",
            Self::Scope => "Invalid scope",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Connection => "Check that the deployment manager is running and reachable",
            Self::Authentication => "Check wsadmin_user and wsadmin_pass",
            Self::Script => "Check the provider attributes against the wsadmin output",
            Self::ToolNotFound => "Check profile_base and dmgr_profile",
            Self::Scope => {
                "Set scope to cell, node, server or cluster with the matching node/server/cluster"
            }
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while driving wsadmin.
#[derive(Debug, Error)]
pub enum Error {
    /// Deployment manager could not be reached
    #[error("connection error: {message}")]
    Connection {
        /// Relevant wsadmin output
        message: String,
    },

    /// Administrative security rejected the credentials
    #[error("authentication failed: {message}")]
    Authentication {
        /// Relevant wsadmin output
        message: String,
    },

    /// Jython script raised an exception
    #[error("script error: {message}")]
    Script {
        /// Relevant wsadmin output
        message: String,
    },

    /// wsadmin.sh not found at the expected location
    #[error("wsadmin not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    /// Scope is unknown or misses the attribute it needs
    #[error("cannot resolve scope: {message}")]
    Scope {
        /// What is wrong with the scope
        message: String,
    },

    /// wsadmin exited unsuccessfully for an unrecognised reason
    #[error("command failed with exit code {code}: {command}")]
    CommandFailed {
        /// Command line with credentials redacted
        command: String,
        /// Exit code or "signal"
        code: String,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Discovery finished without reporting a state
    #[error("unexpected wsadmin output: {0}")]
    UnexpectedOutput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Connection { .. } => ErrorCategory::Connection,
            Error::Authentication { .. } => ErrorCategory::Authentication,
            Error::Script { .. } => ErrorCategory::Script,
            Error::ToolNotFound(_) => ErrorCategory::ToolNotFound,
            Error::Scope { .. } => ErrorCategory::Scope,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Create an error from the output of a failed wsadmin run.
    ///
    /// wsadmin reports most problems on stdout, so both streams are inspected.
    pub fn from_wsadmin_output(
        command: &str,
        code: String,
        stdout: &str,
        stderr: &str,
        tool: &std::path::Path,
    ) -> Self {
        let combined = format!("{stdout}\n{stderr}");
        let lower = combined.to_lowercase();
        let message = first_error_line(&combined);

        // Authentication is checked first: refused credentials are also
        // reported as a failed connection (WASX7246E).
        if lower.contains("admn0022e")
            || lower.contains("secj")
            || lower.contains("access is denied")
            || lower.contains("authentication failed")
            || lower.contains("invalid user id or password")
        {
            return Error::Authentication { message };
        }

        if lower.contains("wasx7023e")
            || lower.contains("wasx7246e")
            || lower.contains("connection refused")
            || lower.contains("connectexception")
            || lower.contains("connection timed out")
            || lower.contains("unknownhostexception")
        {
            return Error::Connection { message };
        }

        if lower.contains("no such file or directory") || lower.contains("command not found") {
            return Error::ToolNotFound(tool.to_path_buf());
        }

        if lower.contains("wasx7017e")
            || lower.contains("wasx7015e")
            || lower.contains("scriptingexception")
            || lower.contains("traceback")
        {
            return Error::Script { message };
        }

        Error::CommandFailed {
            command: command.to_string(),
            code,
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Pick the most useful line out of wsadmin output.
fn first_error_line(output: &str) -> String {
    output
        .lines()
        .map(str::trim)
        .find(|l| l.contains("E: ") || l.contains("Exception"))
        .or_else(|| output.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or("no output")
        .to_string()
}

/// Result type for wsadmin operations.
pub type Result<T> = std::result::Result<T, Error>;
