//! Network interface group resources
//!
//! The one resource kind whose backend mutates synchronously: calls return
//! the affected resource (or nothing, for delete) instead of an operation
//! handle. Callers that need uniform operation semantics wrap the results in
//! [`OperationHandle::Synthetic`](crate::operations::OperationHandle).

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Address prefix in CIDR notation
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default = "default_mtu")]
    pub mtu: u16,
}

fn default_mtu() -> u16 {
    1500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceGroupList {
    #[serde(default)]
    pub items: Vec<NetworkInterfaceGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkInterfaceGroupCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkInterfaceGroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}

pub struct NetworkInterfaceGroupHandler {
    client: StrataClient,
}

impl NetworkInterfaceGroupHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<NetworkInterfaceGroupList> {
        self.client.get("/network-interface-groups").await
    }

    pub async fn get(&self, name: &str) -> Result<NetworkInterfaceGroup> {
        self.client
            .get(&format!("/network-interface-groups/{name}"))
            .await
    }

    /// Create a group; the backend applies the change synchronously and
    /// returns the created resource
    pub async fn create(
        &self,
        request: &NetworkInterfaceGroupCreateRequest,
    ) -> Result<NetworkInterfaceGroup> {
        self.client.post("/network-interface-groups", request).await
    }

    pub async fn update(
        &self,
        name: &str,
        patch: &NetworkInterfaceGroupPatch,
    ) -> Result<NetworkInterfaceGroup> {
        self.client
            .patch(&format!("/network-interface-groups/{name}"), patch)
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client
            .delete_no_content(&format!("/network-interface-groups/{name}"))
            .await
    }
}
