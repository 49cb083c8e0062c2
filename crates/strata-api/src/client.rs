//! HTTP client for the Strata control plane
//!
//! [`StrataClient`] is a cheap-to-clone handle over a shared connection pool.
//! Resource handlers (`VolumeHandler`, `PlacementGroupHandler`, ...) hold a
//! clone and issue requests through the typed helpers here. The client is
//! stateless per-call aside from its bearer token, so it may be shared freely
//! across concurrent workers.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::error::{ApiError, Result};

/// User agent string for Strata HTTP requests
const STRATA_USER_AGENT: &str = concat!("strata-rs/", env!("CARGO_PKG_VERSION"));

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for the Strata REST API
#[derive(Clone)]
pub struct StrataClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for StrataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrataClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Builder for [`StrataClient`]
#[derive(Debug, Default)]
pub struct StrataClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    insecure: bool,
    timeout: Option<Duration>,
}

impl StrataClientBuilder {
    /// Set the API endpoint, e.g. `https://api.strata.example.com/v1`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token attached to every request
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Accept invalid TLS certificates (self-signed test deployments)
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Override the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client, validating the endpoint URL
    pub fn build(self) -> Result<StrataClient> {
        let raw = self
            .base_url
            .ok_or_else(|| ApiError::Connection("no API endpoint configured".to_string()))?;
        let parsed = Url::parse(&raw)
            .map_err(|e| ApiError::Connection(format!("invalid endpoint '{raw}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Connection(format!(
                "unsupported endpoint scheme '{}'",
                parsed.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(STRATA_USER_AGENT)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        Ok(StrataClient {
            http,
            base_url: raw.trim_end_matches('/').to_string(),
            token: self.token,
        })
    }
}

impl StrataClient {
    /// Start building a client
    pub fn builder() -> StrataClientBuilder {
        StrataClientBuilder::default()
    }

    /// The configured API endpoint, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Return a copy of this client carrying the given bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        trace!(%method, %url, "Strata API request");
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        handle_response(resp).await
    }

    pub(crate) async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await?;
        handle_response(resp).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .request(reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.request(reqwest::Method::DELETE, path).send().await?;
        handle_response(resp).await
    }

    /// DELETE for synchronous resource kinds whose backend returns no body
    pub(crate) async fn delete_no_content(&self, path: &str) -> Result<()> {
        let resp = self.request(reqwest::Method::DELETE, path).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(error_from_response(status, resp).await)
    }
}

/// Error body shape returned by the control plane on non-2xx responses
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()));
    }
    Err(error_from_response(status, resp).await)
}

async fn error_from_response(status: StatusCode, resp: Response) -> ApiError {
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body
            }
        });

    let code = status.as_u16();
    match code {
        401 | 403 => ApiError::AuthenticationFailed { message },
        404 => ApiError::NotFound { message },
        429 => ApiError::RateLimited { message },
        500..=599 => ApiError::Server { code, message },
        _ => ApiError::Api { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_endpoint() {
        let result = StrataClient::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_bad_scheme() {
        let result = StrataClient::builder().base_url("ftp://nope").build();
        assert!(matches!(result, Err(ApiError::Connection(_))));
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let client = StrataClient::builder()
            .base_url("https://api.strata.example.com/v1/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://api.strata.example.com/v1");
    }

    #[test]
    fn test_with_token() {
        let client = StrataClient::builder()
            .base_url("https://api.strata.example.com/v1")
            .build()
            .unwrap();
        assert!(client.token.is_none());
        let client = client.with_token("t-123");
        assert_eq!(client.token.as_deref(), Some("t-123"));
    }
}
