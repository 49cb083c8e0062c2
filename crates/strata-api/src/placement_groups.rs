//! Placement group resources
//!
//! A placement group pins a set of volumes to one availability zone and
//! storage service. The creation endpoint does not accept the
//! `destroy_snapshots_on_delete` mode flag; it must be applied with a
//! follow-up PATCH once the group exists.

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub availability_zone: String,
    pub storage_service: String,
    #[serde(default)]
    pub destroy_snapshots_on_delete: bool,
    /// Array the group is currently placed on, when bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementGroupList {
    #[serde(default)]
    pub items: Vec<PlacementGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementGroupCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub availability_zone: String,
    pub storage_service: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlacementGroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy_snapshots_on_delete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<String>,
}

pub struct PlacementGroupHandler {
    client: StrataClient,
}

impl PlacementGroupHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, tenant: &str) -> Result<PlacementGroupList> {
        self.client
            .get(&format!("/tenants/{tenant}/placement-groups"))
            .await
    }

    pub async fn get(&self, tenant: &str, name: &str) -> Result<PlacementGroup> {
        self.client
            .get(&format!("/tenants/{tenant}/placement-groups/{name}"))
            .await
    }

    pub async fn create(
        &self,
        tenant: &str,
        request: &PlacementGroupCreateRequest,
    ) -> Result<Operation> {
        self.client
            .post(&format!("/tenants/{tenant}/placement-groups"), request)
            .await
    }

    pub async fn update(
        &self,
        tenant: &str,
        name: &str,
        patch: &PlacementGroupPatch,
    ) -> Result<Operation> {
        self.client
            .patch(&format!("/tenants/{tenant}/placement-groups/{name}"), patch)
            .await
    }

    pub async fn delete(&self, tenant: &str, name: &str) -> Result<Operation> {
        self.client
            .delete(&format!("/tenants/{tenant}/placement-groups/{name}"))
            .await
    }
}
