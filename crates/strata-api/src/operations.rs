//! The asynchronous `Operation` model
//!
//! Every mutating call against the control plane answers with an
//! [`Operation`] handle rather than a completed result. The server is the
//! only writer: the client refreshes its view by re-fetching the operation by
//! id until the status reaches a terminal state (`Succeeded` or `Failed`).
//! Status transitions are monotonic; once terminal, an operation never
//! returns to `Pending` or `Running`.
//!
//! Resource kinds whose backend mutates synchronously have no server-side
//! operation to poll. Those are modeled as [`OperationHandle::Synthetic`], a
//! client-fabricated completion marker that pollers short-circuit on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;

/// Status of an asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl OperationStatus {
    /// Terminal statuses require no further polling
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationStatus::Pending => "Pending",
            OperationStatus::Running => "Running",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

/// Reference to the resource affected by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Result payload of a succeeded operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
}

/// A single structured diagnostic entry on a failed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub key: String,
    pub value: String,
}

/// Error payload of a failed operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub http_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

/// Server-side handle for an in-flight or completed mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub status: OperationStatus,
    /// Advisory delay hint before the next poll, in milliseconds
    #[serde(rename = "retry_in", default, skip_serializing_if = "Option::is_none")]
    pub retry_in_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<OperationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    /// Whether this operation needs no further polling
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this operation finished successfully.
    ///
    /// Only the status field is authoritative: a result payload on a
    /// non-terminal operation does not make it complete.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }

    /// The affected resource reference, if the result payload carries one
    #[must_use]
    pub fn resource(&self) -> Option<&ResourceRef> {
        self.result.as_ref()?.resource.as_ref()
    }

    /// The advisory retry delay, if the server supplied one
    #[must_use]
    pub fn retry_hint(&self) -> Option<Duration> {
        self.retry_in_ms.map(Duration::from_millis)
    }

    /// Fabricate an immediately-succeeded operation for a synchronous
    /// mutation. This is the only operation the client ever constructs.
    #[must_use]
    pub fn completed(resource: ResourceRef) -> Self {
        Operation {
            id: format!("synthetic-{}", resource.id),
            status: OperationStatus::Succeeded,
            retry_in_ms: None,
            result: Some(OperationResult {
                resource: Some(resource),
            }),
            error: None,
        }
    }
}

/// Tagged handle distinguishing true server operations from client-side
/// completion markers
#[derive(Debug, Clone)]
pub enum OperationHandle {
    /// Server-side operation that must be polled to terminality
    Real(Operation),
    /// Client-fabricated marker for resource kinds whose backend has no
    /// async completion signal; immediately succeeded
    Synthetic(ResourceRef),
}

impl OperationHandle {
    #[must_use]
    pub fn real(operation: Operation) -> Self {
        OperationHandle::Real(operation)
    }

    #[must_use]
    pub fn synthetic(resource: ResourceRef) -> Self {
        OperationHandle::Synthetic(resource)
    }
}

/// Handler for fetching operations by id
///
/// Used exclusively by pollers; mutations never go through this handler.
pub struct OperationsHandler {
    client: StrataClient,
}

impl OperationsHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    /// Fetch the current snapshot of an operation
    pub async fn get(&self, id: &str) -> Result<Operation> {
        self.client.get(&format!("/operations/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_round_trip() {
        let raw = json!({
            "id": "op-123",
            "status": "Running",
            "retry_in": 250,
            "result": null,
            "error": null
        });

        let op: Operation = serde_json::from_value(raw).unwrap();
        assert_eq!(op.id, "op-123");
        assert_eq!(op.status, OperationStatus::Running);
        assert_eq!(op.retry_hint(), Some(Duration::from_millis(250)));
        assert!(!op.is_terminal());
    }

    #[test]
    fn test_succeeded_operation_carries_resource() {
        let raw = json!({
            "id": "op-1",
            "status": "Succeeded",
            "result": { "resource": { "id": "r-42", "name": "vol0" } }
        });

        let op: Operation = serde_json::from_value(raw).unwrap();
        assert!(op.is_terminal());
        assert!(op.succeeded());
        let resource = op.resource().unwrap();
        assert_eq!(resource.id, "r-42");
        assert_eq!(resource.name.as_deref(), Some("vol0"));
    }

    #[test]
    fn test_failed_operation_error_payload() {
        let raw = json!({
            "id": "op-9",
            "status": "Failed",
            "error": {
                "message": "placement group is full",
                "code": "RESOURCE_EXHAUSTED",
                "http_code": 409,
                "details": [ { "key": "placement_group", "value": "pg0" } ]
            }
        });

        let op: Operation = serde_json::from_value(raw).unwrap();
        assert!(op.is_terminal());
        assert!(!op.succeeded());
        let err = op.error.unwrap();
        assert_eq!(err.code, "RESOURCE_EXHAUSTED");
        assert_eq!(err.http_code, 409);
        assert_eq!(err.details.len(), 1);
    }

    #[test]
    fn test_result_on_running_operation_is_not_terminal() {
        // Only the status field decides terminality.
        let raw = json!({
            "id": "op-2",
            "status": "Running",
            "result": { "resource": { "id": "r-1" } }
        });

        let op: Operation = serde_json::from_value(raw).unwrap();
        assert!(!op.is_terminal());
        assert!(!op.succeeded());
        assert!(op.resource().is_some());
    }

    #[test]
    fn test_synthetic_operation_is_succeeded() {
        let op = Operation::completed(ResourceRef {
            id: "nig-7".to_string(),
            name: Some("mgmt-net".to_string()),
        });
        assert!(op.succeeded());
        assert_eq!(op.resource().unwrap().id, "nig-7");
        assert!(op.retry_hint().is_none());
    }

    #[test]
    fn test_missing_hint_is_absent() {
        let raw = json!({ "id": "op-3", "status": "Pending" });
        let op: Operation = serde_json::from_value(raw).unwrap();
        assert!(op.retry_hint().is_none());
        assert!(op.resource().is_none());
    }
}
