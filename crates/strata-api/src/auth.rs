//! Token exchange for access-key credentials

use serde::{Deserialize, Serialize};

use crate::client::StrataClient;
use crate::error::Result;

/// Credentials presented to the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    pub access_key: String,
    pub secret_key: String,
}

/// Bearer token issued by the control plane
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds, if the server reports one
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Handler for the authentication endpoint
pub struct AuthHandler {
    client: StrataClient,
}

impl AuthHandler {
    pub fn new(client: StrataClient) -> Self {
        Self { client }
    }

    /// Exchange access-key credentials for a bearer token
    pub async fn issue_token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        self.client.post("/auth/token", request).await
    }
}
