//! Unified error handling for strata-core
//!
//! Three failure families matter to callers and must stay distinguishable:
//! transport errors (the request never produced an operation), operation
//! failures (the control plane executed the mutation and reported a terminal
//! `Failed`), and ambiguous completion (the operation vanished before a
//! terminal state was observed). Operation failures carry the server-authored
//! diagnostic verbatim so callers can render it as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_core::{CoreError, Result};
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_pending_teardown_race() {
//!         // expected contention during dependent teardown, retry the delete
//!     } else if err.is_not_found() {
//!         println!("Resource not found");
//!     }
//! }
//! ```

use strata_api::ApiError;
use strata_api::operations::{ErrorDetail, Operation};
use thiserror::Error;

use crate::config::ConfigError;

/// Diagnostic code of the dependent-teardown race
pub const PENDING_TEARDOWN_CODE: &str = "FAILED_PRECONDITION";

/// Fixed message text of the dependent-teardown race
///
/// The control plane cannot strictly serialize dependent deletions, so a
/// parent delete issued while a dependent's own deletion is still settling
/// fails with exactly this signature: this code, this message, zero detail
/// entries. Anything else under `FAILED_PRECONDITION` is a real failure.
pub const PENDING_TEARDOWN_MESSAGE: &str = "resource has snapshots pending deletion";

/// Server-authored diagnostic from a terminal `Failed` operation
#[derive(Debug, Clone)]
pub struct OperationFailure {
    pub operation_id: String,
    pub code: String,
    pub message: String,
    pub http_code: u16,
    pub details: Vec<ErrorDetail>,
}

impl OperationFailure {
    /// Extract the diagnostic from a failed operation.
    ///
    /// A `Failed` operation always carries an error payload; if the server
    /// violates that, the failure is still reported rather than dropped.
    #[must_use]
    pub fn from_operation(operation: &Operation) -> Self {
        match &operation.error {
            Some(error) => Self {
                operation_id: operation.id.clone(),
                code: error.code.clone(),
                message: error.message.clone(),
                http_code: error.http_code,
                details: error.details.clone(),
            },
            None => Self {
                operation_id: operation.id.clone(),
                code: String::new(),
                message: "operation failed without an error payload".to_string(),
                http_code: 0,
                details: Vec::new(),
            },
        }
    }

    /// Whether this failure is the recognized dependent-teardown race
    #[must_use]
    pub fn is_pending_teardown_race(&self) -> bool {
        self.code == PENDING_TEARDOWN_CODE
            && self.message == PENDING_TEARDOWN_MESSAGE
            && self.details.is_empty()
    }
}

impl std::fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "operation '{}' failed: {} (code '{}', HTTP {})",
            self.operation_id, self.message, self.code, self.http_code
        )
    }
}

/// Core error type for polling, workflows, and configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Transport-level error: the request could not be completed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A polled operation reached the terminal `Failed` state
    #[error("{0}")]
    OperationFailed(OperationFailure),

    /// The operation disappeared (404) before a terminal state was observed.
    /// It may have been garbage-collected after completing; the outcome is
    /// unknown and must not be coerced to success or failure.
    #[error("operation '{id}' disappeared before a terminal state was observed")]
    OperationVanished { id: String },

    /// An operation reported `Succeeded` without a result reference
    #[error("operation '{id}' succeeded without a result reference")]
    MissingResult { id: String },

    /// The ambient cancellation context fired while waiting
    #[error("operation wait cancelled")]
    Cancelled,

    /// Update attempted to change a field fixed at creation; raised before
    /// any network call
    #[error("field '{field}' of {resource} '{name}' cannot be changed after creation")]
    ImmutableField {
        resource: &'static str,
        name: String,
        field: &'static str,
    },

    /// Aggregated failures from a bulk cleanup fan-out
    #[error("bulk cleanup failed for {} of {attempted} snapshot(s)", failures.len())]
    BulkCleanup {
        attempted: usize,
        failures: Vec<(String, CoreError)>,
    },

    /// Validation error raised before any API call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" transport error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_not_found())
    }

    /// Returns true if the wait was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }

    /// Returns true if the operation itself failed (as opposed to the
    /// request that would have submitted or polled it)
    #[must_use]
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, CoreError::OperationFailed(_))
    }

    /// Returns true if this is the recognized dependent-teardown race
    #[must_use]
    pub fn is_pending_teardown_race(&self) -> bool {
        matches!(self, CoreError::OperationFailed(f) if f.is_pending_teardown_race())
    }

    /// Returns true if this error is potentially retryable at the transport
    /// level
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Api(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_api::operations::{OperationError, OperationStatus};

    fn failed_operation(code: &str, message: &str, details: Vec<ErrorDetail>) -> Operation {
        Operation {
            id: "op-9".to_string(),
            status: OperationStatus::Failed,
            retry_in_ms: None,
            result: None,
            error: Some(OperationError {
                message: message.to_string(),
                code: code.to_string(),
                http_code: 412,
                details,
            }),
        }
    }

    #[test]
    fn test_failure_carries_diagnostics_verbatim() {
        let op = failed_operation(
            "RESOURCE_EXHAUSTED",
            "placement group is full",
            vec![ErrorDetail {
                key: "placement_group".to_string(),
                value: "pg0".to_string(),
            }],
        );
        let failure = OperationFailure::from_operation(&op);

        assert_eq!(failure.operation_id, "op-9");
        assert_eq!(failure.code, "RESOURCE_EXHAUSTED");
        assert_eq!(failure.message, "placement group is full");
        assert_eq!(failure.http_code, 412);
        assert_eq!(failure.details.len(), 1);
    }

    #[test]
    fn test_failure_without_payload_still_reported() {
        let mut op = failed_operation("", "", vec![]);
        op.error = None;
        let failure = OperationFailure::from_operation(&op);
        assert!(failure.message.contains("without an error payload"));
    }

    #[test]
    fn test_teardown_race_signature_recognized() {
        let op = failed_operation(PENDING_TEARDOWN_CODE, PENDING_TEARDOWN_MESSAGE, vec![]);
        let err = CoreError::OperationFailed(OperationFailure::from_operation(&op));
        assert!(err.is_pending_teardown_race());
        assert!(err.is_operation_failure());
    }

    #[test]
    fn test_teardown_race_requires_exact_message() {
        let op = failed_operation(PENDING_TEARDOWN_CODE, "some other precondition", vec![]);
        let err = CoreError::OperationFailed(OperationFailure::from_operation(&op));
        assert!(!err.is_pending_teardown_race());
    }

    #[test]
    fn test_teardown_race_requires_empty_details() {
        let op = failed_operation(
            PENDING_TEARDOWN_CODE,
            PENDING_TEARDOWN_MESSAGE,
            vec![ErrorDetail {
                key: "snapshot".to_string(),
                value: "snap-1".to_string(),
            }],
        );
        let err = CoreError::OperationFailed(OperationFailure::from_operation(&op));
        assert!(!err.is_pending_teardown_race());
    }

    #[test]
    fn test_transport_vs_operation_failure_distinguishable() {
        let transport = CoreError::Api(ApiError::Server {
            code: 503,
            message: "unavailable".to_string(),
        });
        assert!(!transport.is_operation_failure());
        assert!(transport.is_retryable());

        let vanished = CoreError::OperationVanished {
            id: "op-1".to_string(),
        };
        assert!(!vanished.is_operation_failure());
        assert!(!vanished.is_retryable());
    }

    #[test]
    fn test_immutable_field_display() {
        let err = CoreError::ImmutableField {
            resource: "volume",
            name: "vol0".to_string(),
            field: "storage_class",
        };
        let msg = err.to_string();
        assert!(msg.contains("storage_class"));
        assert!(msg.contains("vol0"));
        assert!(msg.contains("cannot be changed"));
    }
}
