//! Compound mutations: ordered write calls, each polled to completion
//!
//! A compound mutation is an ordered list of prepared calls against the
//! control plane. Steps run strictly in sequence: a step's operation is
//! driven to terminality before the next call is issued, and any failure
//! aborts the remaining steps. Steps already applied are not rolled back; the
//! partial application is surfaced to the caller together with the failing
//! step's operation diagnostics.
//!
//! Resource kinds plug in through [`ResourceProvider`], which prepares the
//! calls for each lifecycle phase. The executor depends only on that trait,
//! never on concrete resource types.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use strata_api::operations::{Operation, OperationHandle, ResourceRef};
use strata_api::{ApiError, StrataClient};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::progress::{PollOptions, ProgressCallback, poll_operation};

/// A single write call prepared by a resource provider, ready to execute
pub struct PreparedCall {
    label: String,
    invoke: Box<
        dyn FnOnce(StrataClient) -> BoxFuture<'static, std::result::Result<OperationHandle, ApiError>>
            + Send,
    >,
}

impl PreparedCall {
    /// Wrap an async call producing an operation handle.
    ///
    /// The closure receives its own client clone so the prepared call owns
    /// everything it needs and can outlive the provider that built it.
    pub fn new<F, Fut>(label: impl Into<String>, call: F) -> Self
    where
        F: FnOnce(StrataClient) -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<OperationHandle, ApiError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            invoke: Box::new(move |client| Box::pin(call(client))),
        }
    }

    /// Human-readable step label, used in logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Issue the call against the control plane
    pub async fn execute(
        self,
        client: StrataClient,
    ) -> std::result::Result<OperationHandle, ApiError> {
        (self.invoke)(client).await
    }
}

impl std::fmt::Debug for PreparedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedCall")
            .field("label", &self.label)
            .finish()
    }
}

/// Per-kind capability set the orchestration core depends on
///
/// Each resource kind supplies its own implementation; the executor and the
/// named workflows never reference concrete kinds directly. Because resources
/// are addressed by name within their parent, follow-up calls (the "enrich"
/// part of create-then-enrich) can be prepared before the creation operation
/// settles.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Resource state as read back from the control plane
    type State: Send;

    /// Calls that bring the resource to its desired configuration, in
    /// order. More than one call when some fields are not accepted by the
    /// creation endpoint.
    async fn prepare_create(&self, client: &StrataClient) -> Result<Vec<PreparedCall>>;

    /// Read the current state by name
    async fn read_resource(&self, client: &StrataClient) -> Result<Self::State>;

    /// Calls that move `prior` to the desired configuration. Implementations
    /// must reject changes to fields fixed at creation with
    /// [`CoreError::ImmutableField`] before any network call.
    async fn prepare_update(
        &self,
        client: &StrataClient,
        prior: &Self::State,
    ) -> Result<Vec<PreparedCall>>;

    /// Calls that remove the resource
    async fn prepare_delete(&self, client: &StrataClient) -> Result<Vec<PreparedCall>>;
}

/// Result of a successful compound mutation
#[derive(Debug)]
pub struct MutationOutcome {
    /// Reference from the most recent step that carried one
    pub resource: Option<ResourceRef>,
    /// The last operation observed, for diagnostics
    pub last_operation: Operation,
}

/// Execute prepared calls in order, polling each operation to completion.
///
/// The first failure aborts the sequence: a transport error from issuing a
/// call, or a classified error from its operation, propagates as-is, with
/// the failing step's operation id riding along in
/// [`CoreError::OperationFailed`]. On success the outcome carries the last
/// operation observed regardless of which step produced it.
pub async fn apply_mutation(
    client: &StrataClient,
    calls: Vec<PreparedCall>,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<MutationOutcome> {
    let shared: Option<Arc<dyn Fn(crate::progress::ProgressEvent) + Send + Sync>> =
        on_progress.map(Arc::from);

    let mut resource: Option<ResourceRef> = None;
    let mut last_operation: Option<Operation> = None;

    for call in calls {
        debug!(step = call.label.as_str(), "executing mutation step");
        let handle = call.execute(client.clone()).await?;

        let step_progress = shared
            .clone()
            .map(|cb| Box::new(move |event| (*cb)(event)) as ProgressCallback);
        let operation = poll_operation(client, handle, options, step_progress).await?;

        if let Some(r) = operation.resource() {
            resource = Some(r.clone());
        }
        last_operation = Some(operation);
    }

    match last_operation {
        Some(last_operation) => Ok(MutationOutcome {
            resource,
            last_operation,
        }),
        None => Err(CoreError::Validation(
            "compound mutation prepared no calls".to_string(),
        )),
    }
}
