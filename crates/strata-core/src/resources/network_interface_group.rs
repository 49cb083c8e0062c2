//! Network interface group provider
//!
//! The backend applies these mutations synchronously, so every prepared call
//! wraps its result in a synthetic operation handle that the poller
//! short-circuits on.

use async_trait::async_trait;
use strata_api::StrataClient;
use strata_api::network_interface_groups::{
    NetworkInterfaceGroup, NetworkInterfaceGroupCreateRequest, NetworkInterfaceGroupHandler,
    NetworkInterfaceGroupPatch,
};
use strata_api::operations::{OperationHandle, ResourceRef};

use crate::error::{CoreError, Result};
use crate::orchestrator::{PreparedCall, ResourceProvider};

/// Desired configuration for a network interface group
#[derive(Debug, Clone)]
pub struct NetworkInterfaceGroupConfig {
    pub name: String,
    pub display_name: Option<String>,
    /// Address prefix in CIDR notation; fixed at creation
    pub prefix: String,
    pub gateway: Option<String>,
    pub mtu: Option<u16>,
}

/// [`ResourceProvider`] implementation for network interface groups
pub struct NetworkInterfaceGroupProvider {
    config: NetworkInterfaceGroupConfig,
}

impl NetworkInterfaceGroupProvider {
    pub fn new(config: NetworkInterfaceGroupConfig) -> Self {
        Self { config }
    }
}

fn resource_ref(group: &NetworkInterfaceGroup) -> ResourceRef {
    ResourceRef {
        id: group.id.clone(),
        name: Some(group.name.clone()),
    }
}

#[async_trait]
impl ResourceProvider for NetworkInterfaceGroupProvider {
    type State = NetworkInterfaceGroup;

    async fn prepare_create(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let request = NetworkInterfaceGroupCreateRequest {
            name: self.config.name.clone(),
            display_name: self.config.display_name.clone(),
            prefix: self.config.prefix.clone(),
            gateway: self.config.gateway.clone(),
            mtu: self.config.mtu,
        };

        Ok(vec![PreparedCall::new(
            "network-interface-group.create",
            move |client| async move {
                let group = NetworkInterfaceGroupHandler::new(client)
                    .create(&request)
                    .await?;
                Ok(OperationHandle::synthetic(resource_ref(&group)))
            },
        )])
    }

    async fn read_resource(&self, client: &StrataClient) -> Result<NetworkInterfaceGroup> {
        Ok(NetworkInterfaceGroupHandler::new(client.clone())
            .get(&self.config.name)
            .await?)
    }

    async fn prepare_update(
        &self,
        _client: &StrataClient,
        prior: &NetworkInterfaceGroup,
    ) -> Result<Vec<PreparedCall>> {
        if prior.prefix != self.config.prefix {
            return Err(CoreError::ImmutableField {
                resource: "network interface group",
                name: self.config.name.clone(),
                field: "prefix",
            });
        }

        let name = self.config.name.clone();
        let patch = NetworkInterfaceGroupPatch {
            display_name: self.config.display_name.clone(),
            mtu: self.config.mtu,
        };

        Ok(vec![PreparedCall::new(
            "network-interface-group.update",
            move |client| async move {
                let group = NetworkInterfaceGroupHandler::new(client)
                    .update(&name, &patch)
                    .await?;
                Ok(OperationHandle::synthetic(resource_ref(&group)))
            },
        )])
    }

    async fn prepare_delete(&self, _client: &StrataClient) -> Result<Vec<PreparedCall>> {
        let name = self.config.name.clone();

        Ok(vec![PreparedCall::new(
            "network-interface-group.delete",
            move |client| async move {
                let handler = NetworkInterfaceGroupHandler::new(client);
                // Read first so the synthetic handle carries the real id.
                let group = handler.get(&name).await?;
                handler.delete(&name).await?;
                Ok(OperationHandle::synthetic(resource_ref(&group)))
            },
        )])
    }
}
