//! Volume provider

use async_trait::async_trait;
use strata_api::StrataClient;
use strata_api::operations::OperationHandle;
use strata_api::volumes::{Volume, VolumeCreateRequest, VolumeHandler, VolumePatch};

use crate::error::{CoreError, Result};
use crate::orchestrator::{PreparedCall, ResourceProvider};

/// Desired configuration for a volume under a tenant
#[derive(Debug, Clone)]
pub struct VolumeConfig {
    pub name: String,
    pub display_name: Option<String>,
    /// Provisioned size in bytes
    pub size: u64,
    /// Fixed at creation
    pub storage_class: String,
    pub placement_group: Option<String>,
    pub protection_policy: Option<String>,
}

/// [`ResourceProvider`] implementation for volumes
pub struct VolumeProvider {
    tenant: String,
    config: VolumeConfig,
}

impl VolumeProvider {
    pub fn new(tenant: impl Into<String>, config: VolumeConfig) -> Self {
        Self {
            tenant: tenant.into(),
            config,
        }
    }
}

#[async_trait]
impl ResourceProvider for VolumeProvider {
    type State = Volume;

    async fn prepare_create(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let tenant = self.tenant.clone();
        let request = VolumeCreateRequest {
            name: self.config.name.clone(),
            display_name: self.config.display_name.clone(),
            size: self.config.size,
            storage_class: self.config.storage_class.clone(),
            placement_group: self.config.placement_group.clone(),
            protection_policy: self.config.protection_policy.clone(),
        };

        Ok(vec![PreparedCall::new("volume.create", move |client| {
            async move {
                VolumeHandler::new(client)
                    .create(&tenant, &request)
                    .await
                    .map(OperationHandle::real)
            }
        })])
    }

    async fn read_resource(&self, client: &StrataClient) -> Result<Volume> {
        Ok(VolumeHandler::new(client.clone())
            .get(&self.tenant, &self.config.name)
            .await?)
    }

    async fn prepare_update(
        &self,
        _client: &StrataClient,
        prior: &Volume,
    ) -> Result<Vec<PreparedCall>> {
        if prior.storage_class != self.config.storage_class {
            return Err(CoreError::ImmutableField {
                resource: "volume",
                name: self.config.name.clone(),
                field: "storage_class",
            });
        }

        let tenant = self.tenant.clone();
        let name = self.config.name.clone();
        let patch = VolumePatch {
            display_name: self.config.display_name.clone(),
            size: Some(self.config.size),
            placement_group: self.config.placement_group.clone(),
            protection_policy: self.config.protection_policy.clone(),
        };

        Ok(vec![PreparedCall::new("volume.update", move |client| {
            async move {
                VolumeHandler::new(client)
                    .update(&tenant, &name, &patch)
                    .await
                    .map(OperationHandle::real)
            }
        })])
    }

    async fn prepare_delete(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let tenant = self.tenant.clone();
        let name = self.config.name.clone();

        Ok(vec![PreparedCall::new("volume.delete", move |client| {
            async move {
                VolumeHandler::new(client)
                    .delete(&tenant, &name)
                    .await
                    .map(OperationHandle::real)
            }
        })])
    }
}
