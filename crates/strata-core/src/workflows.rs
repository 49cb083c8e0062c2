//! Strata workflows - multi-step operations
//!
//! These workflows compose the resource providers, the operation poller, and
//! the teardown helpers into the shapes callers actually need: create a
//! resource and wait for it to exist, update it in place, tear it down
//! together with its dependents.

use std::time::{Duration, Instant};

use strata_api::StrataClient;
use strata_api::network_interface_groups::NetworkInterfaceGroup;
use strata_api::operations::OperationHandle;
use strata_api::placement_groups::{PlacementGroup, PlacementGroupHandler};
use strata_api::protection_policies::ProtectionPolicyHandler;
use strata_api::snapshots::{Snapshot, SnapshotHandler, SnapshotPatch};
use strata_api::tenants::{Tenant, TenantCreateRequest, TenantHandler};
use strata_api::volumes::Volume;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::orchestrator::{ResourceProvider, apply_mutation};
use crate::progress::{PollOptions, ProgressCallback, poll_operation};
use crate::resources::{
    NetworkInterfaceGroupConfig, NetworkInterfaceGroupProvider, PlacementGroupConfig,
    PlacementGroupProvider, VolumeConfig, VolumeProvider,
};

/// Default wall-clock budget for retrying a parent delete through the
/// dependent-teardown race
pub const DEFAULT_TEARDOWN_BUDGET: Duration = Duration::from_secs(120);

/// Default pause between parent-delete retries
pub const DEFAULT_TEARDOWN_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Bounds for retrying a delete through the recognized precondition race
#[derive(Debug, Clone)]
pub struct TeardownOptions {
    /// Total wall-clock budget across all retries
    pub budget: Duration,
    /// Pause between retries
    pub retry_interval: Duration,
}

impl Default for TeardownOptions {
    fn default() -> Self {
        Self {
            budget: DEFAULT_TEARDOWN_BUDGET,
            retry_interval: DEFAULT_TEARDOWN_RETRY_INTERVAL,
        }
    }
}

// =============================================================================
// Volume workflows
// =============================================================================

/// Create a volume and wait for completion
///
/// This workflow:
/// 1. Issues the creation call (returns an operation)
/// 2. Polls the operation until completion
/// 3. Fetches and returns the created volume
///
/// # Arguments
///
/// * `client` - The Strata API client
/// * `tenant` - The tenant to create the volume in
/// * `config` - The desired volume configuration
/// * `options` - Poll clamp bounds and cancellation context
/// * `on_progress` - Optional callback for progress updates
///
/// # Example
///
/// ```rust,ignore
/// use strata_core::workflows::create_volume_and_wait;
/// use strata_core::{PollOptions, resources::VolumeConfig};
///
/// let config = VolumeConfig {
///     name: "vol0".to_string(),
///     display_name: None,
///     size: 64 << 30,
///     storage_class: "standard".to_string(),
///     placement_group: Some("pg0".to_string()),
///     protection_policy: None,
/// };
///
/// let volume = create_volume_and_wait(
///     &client,
///     "acme",
///     config,
///     &PollOptions::default(),
///     None,
/// ).await?;
///
/// println!("Created volume: {}", volume.id);
/// ```
pub async fn create_volume_and_wait(
    client: &StrataClient,
    tenant: &str,
    config: VolumeConfig,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Volume> {
    let provider = VolumeProvider::new(tenant, config);
    let calls = provider.prepare_create(client).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    provider.read_resource(client).await
}

/// Update a volume in place and wait for completion
///
/// Reads the current state first; changes to fields fixed at creation are
/// rejected before any write call is issued.
pub async fn update_volume_and_wait(
    client: &StrataClient,
    tenant: &str,
    config: VolumeConfig,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Volume> {
    let provider = VolumeProvider::new(tenant, config);
    let prior = provider.read_resource(client).await?;
    let calls = provider.prepare_update(client, &prior).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    provider.read_resource(client).await
}

/// Delete a volume and wait for completion
pub async fn delete_volume_and_wait(
    client: &StrataClient,
    tenant: &str,
    name: &str,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let provider = VolumeProvider::new(
        tenant,
        VolumeConfig {
            name: name.to_string(),
            display_name: None,
            size: 0,
            storage_class: String::new(),
            placement_group: None,
            protection_policy: None,
        },
    );
    let calls = provider.prepare_delete(client).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    Ok(())
}

// =============================================================================
// Placement group workflows
// =============================================================================

/// Create a placement group and wait for completion
///
/// When the configuration sets `destroy_snapshots_on_delete`, the provider
/// prepares a follow-up PATCH for it (the creation endpoint rejects the
/// flag), and the overall workflow succeeds only if both steps succeed. On
/// failure the error carries the failing step's operation diagnostics.
pub async fn create_placement_group_and_wait(
    client: &StrataClient,
    tenant: &str,
    config: PlacementGroupConfig,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<PlacementGroup> {
    let provider = PlacementGroupProvider::new(tenant, config);
    let calls = provider.prepare_create(client).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    provider.read_resource(client).await
}

/// Update a placement group in place and wait for completion
pub async fn update_placement_group_and_wait(
    client: &StrataClient,
    tenant: &str,
    config: PlacementGroupConfig,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<PlacementGroup> {
    let provider = PlacementGroupProvider::new(tenant, config);
    let prior = provider.read_resource(client).await?;
    let calls = provider.prepare_update(client, &prior).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    provider.read_resource(client).await
}

/// Delete a placement group together with its dependent snapshots
///
/// Dependents are removed best-effort before the parent delete: each
/// snapshot is taken through the two-phase destroy-then-delete sequence, and
/// a failure is logged without aborting sibling cleanup. Only the parent
/// delete's failure is fatal. Because the control plane cannot strictly
/// serialize dependent deletions, the parent delete is retried through the
/// recognized precondition race within `teardown.budget`.
pub async fn delete_placement_group_and_wait(
    client: &StrataClient,
    tenant: &str,
    name: &str,
    options: &PollOptions,
    teardown: &TeardownOptions,
) -> Result<()> {
    let snapshots = SnapshotHandler::new(client.clone())
        .list(tenant, Some(name))
        .await?;

    let mut failed = 0usize;
    for snapshot in &snapshots.items {
        if let Err(err) = remove_snapshot(client, tenant, snapshot, options).await {
            warn!(
                snapshot = %snapshot.name,
                error = %err,
                "dependent snapshot removal failed, continuing with siblings"
            );
            failed += 1;
        }
    }
    if failed > 0 {
        info!(
            failed,
            total = snapshots.items.len(),
            "proceeding to parent delete despite dependent failures"
        );
    }

    let handler = PlacementGroupHandler::new(client.clone());
    let start = Instant::now();
    loop {
        let operation = handler.delete(tenant, name).await?;
        match poll_operation(client, OperationHandle::real(operation), options, None).await {
            Err(err) if err.is_pending_teardown_race() && start.elapsed() < teardown.budget => {
                debug!(
                    placement_group = name,
                    "delete raced with dependent teardown, retrying"
                );
                pause(options, teardown.retry_interval).await?;
            }
            Err(err) => return Err(err),
            Ok(_) => return Ok(()),
        }
    }
}

// =============================================================================
// Protection policy workflows
// =============================================================================

/// Delete a protection policy and wait for completion
///
/// Snapshots created under the policy expire server-side; a delete issued
/// while expiries are still settling fails with the recognized precondition
/// race and is retried within `teardown.budget`.
pub async fn delete_protection_policy_and_wait(
    client: &StrataClient,
    name: &str,
    options: &PollOptions,
    teardown: &TeardownOptions,
) -> Result<()> {
    let start = Instant::now();
    loop {
        let operation = ProtectionPolicyHandler::new(client.clone())
            .delete(name)
            .await?;
        match poll_operation(client, OperationHandle::real(operation), options, None).await {
            Err(err) if err.is_pending_teardown_race() && start.elapsed() < teardown.budget => {
                debug!(policy = name, "delete raced with snapshot expiry, retrying");
                pause(options, teardown.retry_interval).await?;
            }
            Err(err) => return Err(err),
            Ok(_) => return Ok(()),
        }
    }
}

// =============================================================================
// Tenant workflows
// =============================================================================

/// Create a tenant and wait for completion
pub async fn create_tenant_and_wait(
    client: &StrataClient,
    request: &TenantCreateRequest,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<Tenant> {
    let handler = TenantHandler::new(client.clone());
    let operation = handler.create(request).await?;
    poll_operation(client, OperationHandle::real(operation), options, on_progress).await?;
    Ok(handler.get(&request.name).await?)
}

/// Delete a tenant and wait for completion
///
/// The tenant must be empty; deleting a tenant does not cascade to its
/// volumes or placement groups.
pub async fn delete_tenant_and_wait(
    client: &StrataClient,
    name: &str,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let operation = TenantHandler::new(client.clone()).delete(name).await?;
    poll_operation(client, OperationHandle::real(operation), options, on_progress).await?;
    Ok(())
}

// =============================================================================
// Network interface group workflows
// =============================================================================

/// Create a network interface group and wait for completion
///
/// The backend applies the change synchronously; the provider wraps the
/// result in a synthetic operation so callers see uniform semantics.
pub async fn create_network_interface_group_and_wait(
    client: &StrataClient,
    config: NetworkInterfaceGroupConfig,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<NetworkInterfaceGroup> {
    let provider = NetworkInterfaceGroupProvider::new(config);
    let calls = provider.prepare_create(client).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    provider.read_resource(client).await
}

/// Delete a network interface group
pub async fn delete_network_interface_group_and_wait(
    client: &StrataClient,
    name: &str,
    options: &PollOptions,
    on_progress: Option<ProgressCallback>,
) -> Result<()> {
    let provider = NetworkInterfaceGroupProvider::new(NetworkInterfaceGroupConfig {
        name: name.to_string(),
        display_name: None,
        prefix: String::new(),
        gateway: None,
        mtu: None,
    });
    let calls = provider.prepare_delete(client).await?;
    apply_mutation(client, calls, options, on_progress).await?;
    Ok(())
}

// =============================================================================
// Snapshot cleanup
// =============================================================================

/// Remove one snapshot: mark it destroyed if it is still live, then delete
/// it, polling each phase to completion
pub async fn remove_snapshot(
    client: &StrataClient,
    tenant: &str,
    snapshot: &Snapshot,
    options: &PollOptions,
) -> Result<()> {
    let handler = SnapshotHandler::new(client.clone());

    if !snapshot.destroyed {
        let patch = SnapshotPatch {
            destroyed: Some(true),
        };
        let operation = handler.update(tenant, &snapshot.name, &patch).await?;
        poll_operation(client, OperationHandle::real(operation), options, None).await?;
    }

    let operation = handler.delete(tenant, &snapshot.name).await?;
    poll_operation(client, OperationHandle::real(operation), options, None).await?;
    debug!(snapshot = %snapshot.name, "snapshot removed");
    Ok(())
}

/// Remove many snapshots concurrently, one worker per snapshot
///
/// Bulk cleanup for test-support and teardown sweeps. Workers run
/// independently and all of them complete before failures are inspected; a
/// worker's failure never interrupts its siblings. On any failure the
/// aggregate [`CoreError::BulkCleanup`] lists every snapshot that could not
/// be removed.
pub async fn purge_snapshots(
    client: &StrataClient,
    tenant: &str,
    snapshots: Vec<Snapshot>,
    options: &PollOptions,
) -> Result<()> {
    let attempted = snapshots.len();
    let mut workers = JoinSet::new();

    for snapshot in snapshots {
        let client = client.clone();
        let tenant = tenant.to_string();
        let options = options.clone();
        workers.spawn(async move {
            remove_snapshot(&client, &tenant, &snapshot, &options)
                .await
                .map_err(|err| (snapshot.name.clone(), err))
        });
    }

    // Barrier: all workers finish before any failure is acted on.
    let mut failures: Vec<(String, CoreError)> = Vec::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err((name, err))) => {
                warn!(snapshot = %name, error = %err, "snapshot purge worker failed");
                failures.push((name, err));
            }
            Err(join_err) => {
                warn!(error = %join_err, "snapshot purge worker aborted");
                failures.push((
                    "<worker>".to_string(),
                    CoreError::Validation(format!("purge worker aborted: {join_err}")),
                ));
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CoreError::BulkCleanup {
            attempted,
            failures,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Cancellable sleep
async fn pause(options: &PollOptions, duration: Duration) -> Result<()> {
    tokio::select! {
        _ = options.cancel.cancelled() => Err(CoreError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
