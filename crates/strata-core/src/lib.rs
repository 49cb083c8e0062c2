//! # strata-core
//!
//! Core engine for driving the Strata control plane: operation polling,
//! compound multi-step mutations, transient-failure retry, and
//! configuration/connection management. The wire layer lives in
//! [`strata_api`]; this crate owns everything between "the request was
//! submitted" and "the mutation is done".
//!
//! ## What Lives Here
//!
//! - **[`progress`]** - the operation poller: drive an
//!   [`OperationHandle`](strata_api::operations::OperationHandle) to a
//!   terminal state, pacing from server retry hints clamped to sane bounds,
//!   with progress callbacks and cancellation
//! - **[`retry`]** - bounded exponential-backoff retry for transient request
//!   failures (token acquisition)
//! - **[`orchestrator`]** - compound mutations: ordered prepared calls, each
//!   polled to completion, behind the [`ResourceProvider`] trait
//! - **[`resources`]** - per-kind providers (volumes, placement groups,
//!   network interface groups) with client-side immutable-field guards
//! - **[`workflows`]** - named multi-step operations: create-and-wait,
//!   update-and-wait, teardown-with-dependents, bulk snapshot cleanup
//! - **[`connection`]** - profiles/environment to authenticated clients
//! - **[`config`]** - TOML profile loading with `${VAR}` expansion
//! - **[`error`]** - the [`CoreError`] taxonomy: transport errors, operation
//!   failures (server diagnostics verbatim), ambiguous completion,
//!   cancellation, and the recognized dependent-teardown race

pub mod config;
pub mod connection;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod resources;
pub mod retry;
pub mod workflows;

pub use config::{Config, ConfigError, Profile};
pub use connection::ConnectionManager;
pub use error::{CoreError, OperationFailure, Result};
pub use orchestrator::{MutationOutcome, PreparedCall, ResourceProvider, apply_mutation};
pub use progress::{PollOptions, ProgressCallback, ProgressEvent, poll_operation};
pub use retry::{RetryError, RetryPolicy, retry_with_backoff};

// Re-export the cancellation token callers hand to [`PollOptions`].
pub use tokio_util::sync::CancellationToken;
