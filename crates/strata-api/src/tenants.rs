//! Tenant resources
//!
//! Tenants are the top-level namespace; volumes, placement groups, and
//! snapshots all live under a tenant. Mutations are asynchronous and return
//! an [`Operation`](crate::operations::Operation).

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantList {
    #[serde(default)]
    pub items: Vec<Tenant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

pub struct TenantHandler {
    client: StrataClient,
}

impl TenantHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<TenantList> {
        self.client.get("/tenants").await
    }

    pub async fn get(&self, name: &str) -> Result<Tenant> {
        self.client.get(&format!("/tenants/{name}")).await
    }

    pub async fn create(&self, request: &TenantCreateRequest) -> Result<Operation> {
        self.client.post("/tenants", request).await
    }

    pub async fn delete(&self, name: &str) -> Result<Operation> {
        self.client.delete(&format!("/tenants/{name}")).await
    }
}
