//! Protection policy resources

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;
use crate::operations::Operation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Local snapshot retention, e.g. "24h" or "7d"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_retention: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionPolicyList {
    #[serde(default)]
    pub items: Vec<ProtectionPolicy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtectionPolicyCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_retention: Option<String>,
}

pub struct ProtectionPolicyHandler {
    client: StrataClient,
}

impl ProtectionPolicyHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ProtectionPolicyList> {
        self.client.get("/protection-policies").await
    }

    pub async fn get(&self, name: &str) -> Result<ProtectionPolicy> {
        self.client
            .get(&format!("/protection-policies/{name}"))
            .await
    }

    pub async fn create(&self, request: &ProtectionPolicyCreateRequest) -> Result<Operation> {
        self.client.post("/protection-policies", request).await
    }

    /// Delete a policy. Fails with a `FAILED_PRECONDITION` diagnostic while
    /// snapshots created under the policy are still expiring.
    pub async fn delete(&self, name: &str) -> Result<Operation> {
        self.client
            .delete(&format!("/protection-policies/{name}"))
            .await
    }
}
