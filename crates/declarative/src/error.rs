//! Error raised when an executor reports failure

use crate::types::Operation;
use thiserror::Error;

/// Boxed executor failure, kept verbatim
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An executor failed while reconciling one resource.
///
/// The executor's own error is not interpreted here; it is carried as the
/// source with the resource identity attached.
#[derive(Debug, Error)]
#[error("{resource}: {operation} failed: {source}")]
pub struct ExecutionError {
    /// Identity of the resource being reconciled
    pub resource: String,
    /// Operation that failed
    pub operation: Operation,
    /// Underlying executor failure
    #[source]
    pub source: BoxError,
}

impl ExecutionError {
    pub fn new(
        resource: impl Into<String>,
        operation: Operation,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            resource: resource.into(),
            operation,
            source: source.into(),
        }
    }

    /// Downcast the executor failure to a concrete error type
    pub fn cause<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("exit status 105")]
    struct ToolFailure;

    #[test]
    fn test_display_includes_identity_and_cause() {
        let err = ExecutionError::new("oracleJDBC", Operation::Create, ToolFailure);
        assert_eq!(
            err.to_string(),
            "oracleJDBC: create failed: exit status 105"
        );
    }

    #[test]
    fn test_cause_downcast() {
        let err = ExecutionError::new("oracleJDBC", Operation::Destroy, ToolFailure);
        assert!(err.cause::<ToolFailure>().is_some());
        assert!(err.cause::<std::io::Error>().is_none());
    }
}
