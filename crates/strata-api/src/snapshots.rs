//! Snapshot resources
//!
//! Snapshot removal is two-phase: a live snapshot is first marked destroyed
//! (pending-destroy), then deleted for good. Both phases are asynchronous.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub placement_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_policy: Option<String>,
    /// True once the snapshot is in the pending-destroy state
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotList {
    #[serde(default)]
    pub items: Vec<Snapshot>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroyed: Option<bool>,
}

pub struct SnapshotHandler {
    client: StrataClient,
}

impl SnapshotHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    /// List snapshots under a tenant, optionally filtered by placement group
    pub async fn list(&self, tenant: &str, placement_group: Option<&str>) -> Result<SnapshotList> {
        let path = format!("/tenants/{tenant}/snapshots");
        match placement_group {
            Some(group) => {
                self.client
                    .get_query(&path, &[("placement_group", group)])
                    .await
            }
            None => self.client.get(&path).await,
        }
    }

    pub async fn get(&self, tenant: &str, name: &str) -> Result<Snapshot> {
        self.client
            .get(&format!("/tenants/{tenant}/snapshots/{name}"))
            .await
    }

    /// Mark a snapshot destroyed (or restore it) via PATCH
    pub async fn update(
        &self,
        tenant: &str,
        name: &str,
        patch: &SnapshotPatch,
    ) -> Result<Operation> {
        self.client
            .patch(&format!("/tenants/{tenant}/snapshots/{name}"), patch)
            .await
    }

    /// Permanently delete a snapshot; the snapshot must already be destroyed
    pub async fn delete(&self, tenant: &str, name: &str) -> Result<Operation> {
        self.client
            .delete(&format!("/tenants/{tenant}/snapshots/{name}"))
            .await
    }
}
