//! Volume resources
//!
//! Volumes are addressed by name within their tenant
//! (`/tenants/{tenant}/volumes/{name}`), so follow-up calls can be prepared
//! before the creation operation settles. `storage_class` cannot change after
//! creation; that rule is enforced client-side before any update call is
//! issued (see `strata-core`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Provisioned size in bytes
    pub size: u64,
    pub storage_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeList {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub size: u64,
    pub storage_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection_policy: Option<String>,
}

/// Fields settable after creation
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection_policy: Option<String>,
}

pub struct VolumeHandler {
    client: StrataClient,
}

impl VolumeHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, tenant: &str) -> Result<VolumeList> {
        self.client.get(&format!("/tenants/{tenant}/volumes")).await
    }

    pub async fn get(&self, tenant: &str, name: &str) -> Result<Volume> {
        self.client
            .get(&format!("/tenants/{tenant}/volumes/{name}"))
            .await
    }

    pub async fn create(&self, tenant: &str, request: &VolumeCreateRequest) -> Result<Operation> {
        self.client
            .post(&format!("/tenants/{tenant}/volumes"), request)
            .await
    }

    pub async fn update(&self, tenant: &str, name: &str, patch: &VolumePatch) -> Result<Operation> {
        self.client
            .patch(&format!("/tenants/{tenant}/volumes/{name}"), patch)
            .await
    }

    pub async fn delete(&self, tenant: &str, name: &str) -> Result<Operation> {
        self.client
            .delete(&format!("/tenants/{tenant}/volumes/{name}"))
            .await
    }
}
