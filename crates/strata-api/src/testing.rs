//! Mock server and fixture builders for tests
//!
//! Enabled by the `testing` feature. Downstream crates use
//! [`MockStrataServer`] to stand in for the control plane and the fixture
//! builders to assemble wire-shaped payloads without hand-writing JSON.
//!
//! Mocks mount in call order and wiremock matches in mount order, so
//! sequence helpers mount every non-final response with `up_to_n_times(1)`
//! followed by the terminal response with no limit.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::StrataClient;
use crate::network_interface_groups::NetworkInterfaceGroup;
use crate::operations::{
    ErrorDetail, Operation, OperationError, OperationResult, OperationStatus, ResourceRef,
};
use crate::placement_groups::PlacementGroup;
use crate::snapshots::{Snapshot, SnapshotList};
use crate::volumes::Volume;

/// A wiremock-backed stand-in for the Strata control plane
pub struct MockStrataServer {
    server: MockServer,
}

impl MockStrataServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URI of the mock server
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying wiremock server, for custom mocks and request
    /// inspection
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// A client pointed at this mock server
    pub fn client(&self) -> StrataClient {
        StrataClient::builder()
            .base_url(self.server.uri())
            .token("test-token")
            .build()
            .expect("mock server URI is always valid")
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Serve one fixed snapshot of an operation on every fetch
    pub async fn mock_operation(&self, operation: &Operation) {
        Mock::given(method("GET"))
            .and(path(format!("/operations/{}", operation.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    /// Serve a sequence of snapshots for one operation id: each non-final
    /// snapshot is returned exactly once, the final one indefinitely
    pub async fn mock_operation_sequence(&self, id: &str, snapshots: Vec<Operation>) {
        let total = snapshots.len();
        for (i, snapshot) in snapshots.into_iter().enumerate() {
            let mock = Mock::given(method("GET"))
                .and(path(format!("/operations/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(&snapshot));
            if i + 1 < total {
                mock.up_to_n_times(1).mount(&self.server).await;
            } else {
                mock.mount(&self.server).await;
            }
        }
    }

    /// Serve 404 for an operation id (garbage-collected after completion)
    pub async fn mock_operation_not_found(&self, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/operations/{id}")))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "message": "operation not found" })),
            )
            .mount(&self.server)
            .await;
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn mock_token(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": access_token,
                "expires_in": 3600
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail token issuance with a 5xx `failures` times, then succeed
    pub async fn mock_token_flaky(&self, failures: u64, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(serde_json::json!({ "message": "token service unavailable" })),
            )
            .up_to_n_times(failures)
            .mount(&self.server)
            .await;
        self.mock_token(access_token).await;
    }

    // ------------------------------------------------------------------
    // Volumes
    // ------------------------------------------------------------------

    pub async fn mock_volume_create(&self, tenant: &str, operation: &Operation) {
        Mock::given(method("POST"))
            .and(path(format!("/tenants/{tenant}/volumes")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_volume_get(&self, tenant: &str, volume: &Volume) {
        Mock::given(method("GET"))
            .and(path(format!("/tenants/{}/volumes/{}", tenant, volume.name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(volume))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_volume_update(&self, tenant: &str, name: &str, operation: &Operation) {
        Mock::given(method("PATCH"))
            .and(path(format!("/tenants/{tenant}/volumes/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_volume_delete(&self, tenant: &str, name: &str, operation: &Operation) {
        Mock::given(method("DELETE"))
            .and(path(format!("/tenants/{tenant}/volumes/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    // ------------------------------------------------------------------
    // Placement groups
    // ------------------------------------------------------------------

    pub async fn mock_placement_group_create(&self, tenant: &str, operation: &Operation) {
        Mock::given(method("POST"))
            .and(path(format!("/tenants/{tenant}/placement-groups")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_placement_group_get(&self, tenant: &str, group: &PlacementGroup) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/tenants/{}/placement-groups/{}",
                tenant, group.name
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(group))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_placement_group_update(
        &self,
        tenant: &str,
        name: &str,
        operation: &Operation,
    ) {
        Mock::given(method("PATCH"))
            .and(path(format!("/tenants/{tenant}/placement-groups/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_placement_group_delete(
        &self,
        tenant: &str,
        name: &str,
        operation: &Operation,
    ) {
        Mock::given(method("DELETE"))
            .and(path(format!("/tenants/{tenant}/placement-groups/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    /// Answer successive DELETE calls for one group with successive
    /// operations; the final operation repeats indefinitely
    pub async fn mock_placement_group_delete_sequence(
        &self,
        tenant: &str,
        name: &str,
        operations: Vec<Operation>,
    ) {
        let total = operations.len();
        for (i, operation) in operations.into_iter().enumerate() {
            let mock = Mock::given(method("DELETE"))
                .and(path(format!("/tenants/{tenant}/placement-groups/{name}")))
                .respond_with(ResponseTemplate::new(202).set_body_json(&operation));
            if i + 1 < total {
                mock.up_to_n_times(1).mount(&self.server).await;
            } else {
                mock.mount(&self.server).await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub async fn mock_snapshot_list(
        &self,
        tenant: &str,
        placement_group: Option<&str>,
        snapshots: Vec<Snapshot>,
    ) {
        let body = SnapshotList { items: snapshots };
        let mut mock = Mock::given(method("GET")).and(path(format!("/tenants/{tenant}/snapshots")));
        if let Some(group) = placement_group {
            mock = mock.and(query_param("placement_group", group));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_snapshot_update(&self, tenant: &str, name: &str, operation: &Operation) {
        Mock::given(method("PATCH"))
            .and(path(format!("/tenants/{tenant}/snapshots/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_snapshot_delete(&self, tenant: &str, name: &str, operation: &Operation) {
        Mock::given(method("DELETE"))
            .and(path(format!("/tenants/{tenant}/snapshots/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    /// Fail a snapshot delete with the given status `failures` times, then
    /// answer with the operation
    pub async fn mock_snapshot_delete_flaky(
        &self,
        tenant: &str,
        name: &str,
        status: u16,
        failures: u64,
        operation: &Operation,
    ) {
        Mock::given(method("DELETE"))
            .and(path(format!("/tenants/{tenant}/snapshots/{name}")))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "message": "snapshot delete failed" })),
            )
            .up_to_n_times(failures)
            .mount(&self.server)
            .await;
        self.mock_snapshot_delete(tenant, name, operation).await;
    }

    // ------------------------------------------------------------------
    // Protection policies
    // ------------------------------------------------------------------

    pub async fn mock_protection_policy_delete(&self, name: &str, operation: &Operation) {
        Mock::given(method("DELETE"))
            .and(path(format!("/protection-policies/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    /// Answer successive policy DELETE calls with successive operations
    pub async fn mock_protection_policy_delete_sequence(
        &self,
        name: &str,
        operations: Vec<Operation>,
    ) {
        let total = operations.len();
        for (i, operation) in operations.into_iter().enumerate() {
            let mock = Mock::given(method("DELETE"))
                .and(path(format!("/protection-policies/{name}")))
                .respond_with(ResponseTemplate::new(202).set_body_json(&operation));
            if i + 1 < total {
                mock.up_to_n_times(1).mount(&self.server).await;
            } else {
                mock.mount(&self.server).await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Tenants
    // ------------------------------------------------------------------

    pub async fn mock_tenant_create(&self, operation: &Operation) {
        Mock::given(method("POST"))
            .and(path("/tenants"))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_tenant_delete(&self, name: &str, operation: &Operation) {
        Mock::given(method("DELETE"))
            .and(path(format!("/tenants/{name}")))
            .respond_with(ResponseTemplate::new(202).set_body_json(operation))
            .mount(&self.server)
            .await;
    }

    // ------------------------------------------------------------------
    // Network interface groups
    // ------------------------------------------------------------------

    pub async fn mock_nig_create(&self, group: &NetworkInterfaceGroup) {
        Mock::given(method("POST"))
            .and(path("/network-interface-groups"))
            .respond_with(ResponseTemplate::new(201).set_body_json(group))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_nig_delete(&self, name: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/network-interface-groups/{name}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }
}

// ----------------------------------------------------------------------
// Fixture builders
// ----------------------------------------------------------------------

/// Builder for wire-shaped [`Operation`] payloads
pub struct OperationFixture {
    operation: Operation,
}

impl OperationFixture {
    pub fn new(id: &str) -> Self {
        Self {
            operation: Operation {
                id: id.to_string(),
                status: OperationStatus::Pending,
                retry_in_ms: None,
                result: None,
                error: None,
            },
        }
    }

    pub fn status(mut self, status: OperationStatus) -> Self {
        self.operation.status = status;
        self
    }

    pub fn retry_in_ms(mut self, ms: u64) -> Self {
        self.operation.retry_in_ms = Some(ms);
        self
    }

    /// Attach a result payload without touching the status
    pub fn resource(mut self, id: &str, name: &str) -> Self {
        self.operation.result = Some(OperationResult {
            resource: Some(ResourceRef {
                id: id.to_string(),
                name: Some(name.to_string()),
            }),
        });
        self
    }

    /// Mark succeeded with the given resource reference
    pub fn succeeded(self, resource_id: &str, name: &str) -> Self {
        self.status(OperationStatus::Succeeded)
            .resource(resource_id, name)
    }

    /// Mark failed with the given diagnostic
    pub fn failed(mut self, code: &str, message: &str, http_code: u16) -> Self {
        self.operation.status = OperationStatus::Failed;
        self.operation.error = Some(OperationError {
            message: message.to_string(),
            code: code.to_string(),
            http_code,
            details: Vec::new(),
        });
        self
    }

    /// Append a structured detail entry to the error payload
    pub fn detail(mut self, key: &str, value: &str) -> Self {
        if let Some(error) = self.operation.error.as_mut() {
            error.details.push(ErrorDetail {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    pub fn build(self) -> Operation {
        self.operation
    }
}

/// Builder for [`Volume`] payloads
pub struct VolumeFixture {
    volume: Volume,
}

impl VolumeFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            volume: Volume {
                id: id.to_string(),
                name: name.to_string(),
                display_name: None,
                size: 1 << 30,
                storage_class: "standard".to_string(),
                placement_group: None,
                protection_policy: None,
                created_at: None,
            },
        }
    }

    pub fn size(mut self, size: u64) -> Self {
        self.volume.size = size;
        self
    }

    pub fn storage_class(mut self, class: &str) -> Self {
        self.volume.storage_class = class.to_string();
        self
    }

    pub fn placement_group(mut self, group: &str) -> Self {
        self.volume.placement_group = Some(group.to_string());
        self
    }

    pub fn protection_policy(mut self, policy: &str) -> Self {
        self.volume.protection_policy = Some(policy.to_string());
        self
    }

    pub fn build(self) -> Volume {
        self.volume
    }
}

/// Builder for [`Snapshot`] payloads
pub struct SnapshotFixture {
    snapshot: Snapshot,
}

impl SnapshotFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            snapshot: Snapshot {
                id: id.to_string(),
                name: name.to_string(),
                placement_group: String::new(),
                protection_policy: None,
                destroyed: false,
                created_at: None,
            },
        }
    }

    pub fn placement_group(mut self, group: &str) -> Self {
        self.snapshot.placement_group = group.to_string();
        self
    }

    pub fn protection_policy(mut self, policy: &str) -> Self {
        self.snapshot.protection_policy = Some(policy.to_string());
        self
    }

    pub fn destroyed(mut self, destroyed: bool) -> Self {
        self.snapshot.destroyed = destroyed;
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// Builder for [`PlacementGroup`] payloads
pub struct PlacementGroupFixture {
    group: PlacementGroup,
}

impl PlacementGroupFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            group: PlacementGroup {
                id: id.to_string(),
                name: name.to_string(),
                display_name: None,
                availability_zone: "az-1".to_string(),
                storage_service: "block".to_string(),
                destroy_snapshots_on_delete: false,
                array: None,
            },
        }
    }

    pub fn availability_zone(mut self, zone: &str) -> Self {
        self.group.availability_zone = zone.to_string();
        self
    }

    pub fn storage_service(mut self, service: &str) -> Self {
        self.group.storage_service = service.to_string();
        self
    }

    pub fn destroy_snapshots_on_delete(mut self, value: bool) -> Self {
        self.group.destroy_snapshots_on_delete = value;
        self
    }

    pub fn build(self) -> PlacementGroup {
        self.group
    }
}

/// Builder for [`NetworkInterfaceGroup`] payloads
pub struct NetworkInterfaceGroupFixture {
    group: NetworkInterfaceGroup,
}

impl NetworkInterfaceGroupFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            group: NetworkInterfaceGroup {
                id: id.to_string(),
                name: name.to_string(),
                display_name: None,
                prefix: "10.0.0.0/24".to_string(),
                gateway: None,
                mtu: 1500,
            },
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.group.prefix = prefix.to_string();
        self
    }

    pub fn gateway(mut self, gateway: &str) -> Self {
        self.group.gateway = Some(gateway.to_string());
        self
    }

    pub fn mtu(mut self, mtu: u16) -> Self {
        self.group.mtu = mtu;
        self
    }

    pub fn build(self) -> NetworkInterfaceGroup {
        self.group
    }
}
