//! Array inventory (read-only)

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;

/// A storage array registered with the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Array {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appliance_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayList {
    #[serde(default)]
    pub items: Vec<Array>,
}

pub struct ArrayHandler {
    client: StrataClient,
}

impl ArrayHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ArrayList> {
        self.client.get("/arrays").await
    }

    pub async fn get(&self, name: &str) -> Result<Array> {
        self.client.get(&format!("/arrays/{name}")).await
    }
}
