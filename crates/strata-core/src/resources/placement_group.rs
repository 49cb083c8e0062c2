//! Placement group provider
//!
//! The canonical create-then-enrich kind: the creation endpoint does not
//! accept `destroy_snapshots_on_delete`, so when the desired configuration
//! sets it the provider prepares a follow-up PATCH, polled as its own step.

use async_trait::async_trait;
use strata_api::StrataClient;
use strata_api::operations::OperationHandle;
use strata_api::placement_groups::{
    PlacementGroup, PlacementGroupCreateRequest, PlacementGroupHandler, PlacementGroupPatch,
};

use crate::error::{CoreError, Result};
use crate::orchestrator::{PreparedCall, ResourceProvider};

/// Desired configuration for a placement group under a tenant
#[derive(Debug, Clone)]
pub struct PlacementGroupConfig {
    pub name: String,
    pub display_name: Option<String>,
    /// Fixed at creation
    pub availability_zone: String,
    /// Fixed at creation
    pub storage_service: String,
    /// Only settable by PATCH once the group exists
    pub destroy_snapshots_on_delete: bool,
}

/// [`ResourceProvider`] implementation for placement groups
pub struct PlacementGroupProvider {
    tenant: String,
    config: PlacementGroupConfig,
}

impl PlacementGroupProvider {
    pub fn new(tenant: impl Into<String>, config: PlacementGroupConfig) -> Self {
        Self {
            tenant: tenant.into(),
            config,
        }
    }

    fn enrich_call(&self) -> PreparedCall {
        let tenant = self.tenant.clone();
        let name = self.config.name.clone();
        let patch = PlacementGroupPatch {
            destroy_snapshots_on_delete: Some(self.config.destroy_snapshots_on_delete),
            ..PlacementGroupPatch::default()
        };

        PreparedCall::new("placement-group.enrich", move |client| async move {
            PlacementGroupHandler::new(client)
                .update(&tenant, &name, &patch)
                .await
                .map(OperationHandle::real)
        })
    }
}

#[async_trait]
impl ResourceProvider for PlacementGroupProvider {
    type State = PlacementGroup;

    async fn prepare_create(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let tenant = self.tenant.clone();
        let request = PlacementGroupCreateRequest {
            name: self.config.name.clone(),
            display_name: self.config.display_name.clone(),
            availability_zone: self.config.availability_zone.clone(),
            storage_service: self.config.storage_service.clone(),
        };

        let mut calls = vec![PreparedCall::new(
            "placement-group.create",
            move |client| async move {
                PlacementGroupHandler::new(client)
                    .create(&tenant, &request)
                    .await
                    .map(OperationHandle::real)
            },
        )];

        if self.config.destroy_snapshots_on_delete {
            calls.push(self.enrich_call());
        }

        Ok(calls)
    }

    async fn read_resource(&self, client: &StrataClient) -> Result<PlacementGroup> {
        Ok(PlacementGroupHandler::new(client.clone())
            .get(&self.tenant, &self.config.name)
            .await?)
    }

    async fn prepare_update(
        &self,
        _client: &StrataClient,
        prior: &PlacementGroup,
    ) -> Result<Vec<PreparedCall>> {
        if prior.availability_zone != self.config.availability_zone {
            return Err(CoreError::ImmutableField {
                resource: "placement group",
                name: self.config.name.clone(),
                field: "availability_zone",
            });
        }
        if prior.storage_service != self.config.storage_service {
            return Err(CoreError::ImmutableField {
                resource: "placement group",
                name: self.config.name.clone(),
                field: "storage_service",
            });
        }

        let tenant = self.tenant.clone();
        let name = self.config.name.clone();
        let patch = PlacementGroupPatch {
            display_name: self.config.display_name.clone(),
            destroy_snapshots_on_delete: Some(self.config.destroy_snapshots_on_delete),
            array: None,
        };

        Ok(vec![PreparedCall::new(
            "placement-group.update",
            move |client| async move {
                PlacementGroupHandler::new(client)
                    .update(&tenant, &name, &patch)
                    .await
                    .map(OperationHandle::real)
            },
        )])
    }

    async fn prepare_delete(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let tenant = self.tenant.clone();
        let name = self.config.name.clone();

        Ok(vec![PreparedCall::new(
            "placement-group.delete",
            move |client| async move {
                PlacementGroupHandler::new(client)
                    .delete(&tenant, &name)
                    .await
                    .map(OperationHandle::real)
            },
        )])
    }
}
