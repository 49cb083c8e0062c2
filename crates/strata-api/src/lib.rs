//! # strata-api
//!
//! Typed REST client for the Strata storage orchestration control plane.
//!
//! Every mutating endpoint answers with an [`Operation`] handle that must be
//! polled to a terminal state; the polling engine and higher-level workflows
//! live in `strata-core`. This crate covers the wire layer only:
//!
//! - [`StrataClient`] - authenticated HTTP client, cheap to clone
//! - Per-resource handlers (`VolumeHandler`, `PlacementGroupHandler`, ...)
//!   with typed request/response structs
//! - The [`Operation`] model, including the [`OperationHandle`] tagged
//!   variant for resource kinds whose backend mutates synchronously
//! - [`ApiError`] with status-range classification helpers
//! - A [`testing`] module (feature `testing`) with a wiremock-backed mock
//!   server and fixture builders
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_api::{StrataClient, VolumeHandler};
//!
//! let client = StrataClient::builder()
//!     .base_url("https://api.strata.example.com/v1")
//!     .token(token)
//!     .build()?;
//!
//! let volumes = VolumeHandler::new(client.clone());
//! let operation = volumes.create("acme", &request).await?;
//! // hand `operation` to strata-core's poller
//! ```

pub mod arrays;
pub mod auth;
pub mod client;
pub mod error;
pub mod network_interface_groups;
pub mod operations;
pub mod placement_groups;
pub mod protection_policies;
pub mod snapshots;
pub mod tenants;
pub mod volumes;

#[cfg(feature = "testing")]
pub mod testing;

pub use client::{StrataClient, StrataClientBuilder};
pub use error::{ApiError, Result};

pub use arrays::{Array, ArrayHandler, ArrayList};
pub use auth::{AuthHandler, TokenRequest, TokenResponse};
pub use network_interface_groups::{
    NetworkInterfaceGroup, NetworkInterfaceGroupCreateRequest, NetworkInterfaceGroupHandler,
    NetworkInterfaceGroupList, NetworkInterfaceGroupPatch,
};
pub use operations::{
    ErrorDetail, Operation, OperationError, OperationHandle, OperationResult, OperationStatus,
    OperationsHandler, ResourceRef,
};
pub use placement_groups::{
    PlacementGroup, PlacementGroupCreateRequest, PlacementGroupHandler, PlacementGroupList,
    PlacementGroupPatch,
};
pub use protection_policies::{
    ProtectionPolicy, ProtectionPolicyCreateRequest, ProtectionPolicyHandler, ProtectionPolicyList,
};
pub use snapshots::{Snapshot, SnapshotHandler, SnapshotList, SnapshotPatch};
pub use tenants::{Tenant, TenantCreateRequest, TenantHandler, TenantList};
pub use volumes::{Volume, VolumeCreateRequest, VolumeHandler, VolumeList, VolumePatch};
