//! Progress tracking and operation polling
//!
//! Mutating calls against the control plane return an `Operation` which must
//! be polled until it reaches a terminal state. This module provides that
//! polling with optional progress callbacks for UI updates.
//!
//! Pacing comes from the server: each operation snapshot carries an advisory
//! `retry_in` hint, clamped here to a floor (no busy-looping on a zero or
//! missing hint) and a ceiling (a single sleep never grows so long that
//! cancellation stops being responsive). Total polling duration is unbounded;
//! legitimate operations can take minutes, so the only way out of a healthy
//! poll loop is a terminal status or the caller's [`CancellationToken`].

use std::time::{Duration, Instant};

use strata_api::StrataClient;
use strata_api::operations::{
    Operation, OperationHandle, OperationStatus, OperationsHandler, ResourceRef,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CoreError, OperationFailure, Result};

/// Default floor for the clamped retry hint
pub const DEFAULT_POLL_FLOOR: Duration = Duration::from_millis(500);

/// Default ceiling for the clamped retry hint
pub const DEFAULT_POLL_CEILING: Duration = Duration::from_secs(30);

/// Progress events emitted while waiting on an operation
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling has begun for a server-side operation
    Started { operation_id: String },
    /// One polling iteration with the current status
    Polling {
        operation_id: String,
        status: OperationStatus,
        elapsed: Duration,
    },
    /// The operation succeeded
    Completed {
        operation_id: String,
        resource: Option<ResourceRef>,
    },
    /// The operation failed
    Failed { operation_id: String, error: String },
}

/// Callback type for progress updates
///
/// CLI-style callers can use this to drive spinners; headless callers pass
/// `None`.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Clamp bounds and cancellation context for a poll loop
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Minimum sleep between polls
    pub floor: Duration,
    /// Maximum single sleep
    pub ceiling: Duration,
    /// Ambient cancellation context; polling is otherwise unbounded
    pub cancel: CancellationToken,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            floor: DEFAULT_POLL_FLOOR,
            ceiling: DEFAULT_POLL_CEILING,
            cancel: CancellationToken::new(),
        }
    }
}

impl PollOptions {
    /// Options bound to an existing cancellation token
    #[must_use]
    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    /// Options from a profile's poll configuration, with a fresh token
    #[must_use]
    pub fn from_config(config: &crate::config::PollConfig) -> Self {
        Self {
            floor: Duration::from_millis(config.floor_ms),
            ceiling: Duration::from_millis(config.ceiling_ms),
            cancel: CancellationToken::new(),
        }
    }

    fn clamp_hint(&self, hint: Option<Duration>) -> Duration {
        hint.unwrap_or(self.floor).max(self.floor).min(self.ceiling)
    }
}

/// Poll an operation until it reaches a terminal state
///
/// A [`OperationHandle::Synthetic`] handle short-circuits to an
/// immediately-succeeded operation without touching the network. For a real
/// handle the loop is: check terminality, sleep the clamped hint, re-fetch by
/// id, repeat. A 404 on re-fetch means the operation may have been
/// garbage-collected after completion and is reported as the distinct
/// [`CoreError::OperationVanished`]; any other transport error propagates
/// immediately. Retries of flaky transports belong to
/// [`retry_with_backoff`](crate::retry::retry_with_backoff), not here.
///
/// # Arguments
///
/// * `client` - The Strata API client
/// * `handle` - The operation handle returned by a mutating call
/// * `options` - Clamp bounds and cancellation context
/// * `on_progress` - Optional callback for progress updates
///
/// # Returns
///
/// The terminal succeeded operation (its result reference is guaranteed
/// non-empty), or a classified error.
///
/// # Example
///
/// ```rust,ignore
/// use strata_core::{PollOptions, poll_operation};
/// use strata_api::operations::OperationHandle;
///
/// let operation = volumes.create("acme", &request).await?;
/// let done = poll_operation(
///     &client,
///     OperationHandle::real(operation),
///     &PollOptions::default(),
///     Some(Box::new(|event| println!("{event:?}"))),
/// )
/// .await?;
/// println!("created {}", done.resource().unwrap().id);
/// ```
pub async fn poll_operation(
    client: &StrataClient,
    handle: OperationHandle,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Operation> {
    let mut operation = match handle {
        OperationHandle::Synthetic(resource) => {
            // Synchronous backend: the mutation already settled server-side.
            let operation = Operation::completed(resource);
            emit(
                &on_progress,
                ProgressEvent::Completed {
                    operation_id: operation.id.clone(),
                    resource: operation.resource().cloned(),
                },
            );
            return Ok(operation);
        }
        OperationHandle::Real(operation) => operation,
    };

    let start = Instant::now();
    let handler = OperationsHandler::new(client.clone());

    emit(
        &on_progress,
        ProgressEvent::Started {
            operation_id: operation.id.clone(),
        },
    );

    loop {
        // Only the status field decides terminality; a result payload on a
        // running operation proves nothing.
        if operation.is_terminal() {
            return settle(operation, &on_progress);
        }

        emit(
            &on_progress,
            ProgressEvent::Polling {
                operation_id: operation.id.clone(),
                status: operation.status,
                elapsed: start.elapsed(),
            },
        );

        let delay = options.clamp_hint(operation.retry_hint());
        tokio::select! {
            _ = options.cancel.cancelled() => {
                debug!(operation_id = %operation.id, "operation wait cancelled");
                return Err(CoreError::Cancelled);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        operation = match handler.get(&operation.id).await {
            Ok(fresh) => fresh,
            Err(e) if e.is_not_found() => {
                warn!(
                    operation_id = %operation.id,
                    "operation vanished before a terminal state was observed"
                );
                return Err(CoreError::OperationVanished { id: operation.id });
            }
            Err(e) => return Err(CoreError::Api(e)),
        };
    }
}

fn settle(operation: Operation, on_progress: &Option<ProgressCallback>) -> Result<Operation> {
    if operation.succeeded() {
        if operation.resource().is_none() {
            return Err(CoreError::MissingResult { id: operation.id });
        }
        emit(
            on_progress,
            ProgressEvent::Completed {
                operation_id: operation.id.clone(),
                resource: operation.resource().cloned(),
            },
        );
        return Ok(operation);
    }

    let failure = OperationFailure::from_operation(&operation);
    emit(
        on_progress,
        ProgressEvent::Failed {
            operation_id: operation.id.clone(),
            error: failure.to_string(),
        },
    );
    Err(CoreError::OperationFailed(failure))
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_hint_floor() {
        let options = PollOptions {
            floor: Duration::from_millis(100),
            ceiling: Duration::from_secs(10),
            cancel: CancellationToken::new(),
        };
        assert_eq!(options.clamp_hint(None), Duration::from_millis(100));
        assert_eq!(
            options.clamp_hint(Some(Duration::ZERO)),
            Duration::from_millis(100)
        );
        assert_eq!(
            options.clamp_hint(Some(Duration::from_millis(50))),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_clamp_hint_ceiling() {
        let options = PollOptions {
            floor: Duration::from_millis(100),
            ceiling: Duration::from_secs(10),
            cancel: CancellationToken::new(),
        };
        assert_eq!(
            options.clamp_hint(Some(Duration::from_secs(3600))),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_clamp_hint_in_range_passes_through() {
        let options = PollOptions::default();
        assert_eq!(
            options.clamp_hint(Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
    }
}
