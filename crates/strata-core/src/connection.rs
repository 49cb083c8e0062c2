//! Connection management: profiles and environment to authenticated clients
//!
//! Resolution precedence is "explicit wins": when all three `STRATA_*`
//! variables are present they bypass profiles entirely; otherwise the named
//! (or default) profile supplies values and individual variables may still
//! override single fields. Token acquisition goes through the retry
//! primitive so a transient control-plane hiccup does not fail the whole
//! connection attempt.

use strata_api::StrataClient;
use strata_api::auth::{AuthHandler, TokenRequest};
use tracing::{debug, info, trace};

use crate::config::{Config, ResilienceConfig};
use crate::error::Result;
use crate::retry::{RetryPolicy, classify_api_error, retry_with_backoff};

/// Environment variable overriding the API endpoint
pub const ENV_API_URL: &str = "STRATA_API_URL";
/// Environment variable overriding the access key
pub const ENV_ACCESS_KEY: &str = "STRATA_ACCESS_KEY";
/// Environment variable overriding the secret key
pub const ENV_SECRET_KEY: &str = "STRATA_SECRET_KEY";

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
}

struct ResolvedCredentials {
    endpoint: String,
    access_key: String,
    secret_key: String,
    insecure: bool,
    resilience: ResilienceConfig,
}

impl ConnectionManager {
    /// Create a new connection manager with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create an authenticated client from profile credentials with
    /// environment variable override support
    ///
    /// Exchanges the resolved access-key credentials for a bearer token,
    /// retrying transient (5xx, connection-level) failures per the profile's
    /// retry configuration.
    pub async fn create_client(&self, profile_name: Option<&str>) -> Result<StrataClient> {
        debug!("Creating Strata client");
        trace!("Profile name: {:?}", profile_name);

        let resolved = self.resolve_credentials(profile_name)?;

        let client = StrataClient::builder()
            .base_url(&resolved.endpoint)
            .insecure(resolved.insecure)
            .build()?;

        let auth = AuthHandler::new(client.clone());
        let request = TokenRequest {
            access_key: resolved.access_key,
            secret_key: resolved.secret_key,
        };
        let policy = RetryPolicy::from_config(&resolved.resilience.retry);

        info!(endpoint = %resolved.endpoint, "requesting access token");
        let auth_ref = &auth;
        let request_ref = &request;
        let token = retry_with_backoff(policy, move |attempt| async move {
            debug!(attempt, "token acquisition attempt");
            auth_ref
                .issue_token(request_ref)
                .await
                .map_err(classify_api_error)
        })
        .await?;

        Ok(client.with_token(token.access_token))
    }

    fn resolve_credentials(&self, profile_name: Option<&str>) -> Result<ResolvedCredentials> {
        let env_url = std::env::var(ENV_API_URL).ok();
        let env_access = std::env::var(ENV_ACCESS_KEY).ok();
        let env_secret = std::env::var(ENV_SECRET_KEY).ok();

        if let (Some(url), Some(access), Some(secret)) = (&env_url, &env_access, &env_secret) {
            info!("using Strata credentials from environment variables");
            return Ok(ResolvedCredentials {
                endpoint: url.clone(),
                access_key: access.clone(),
                secret_key: secret.clone(),
                insecure: false,
                resilience: ResilienceConfig::default(),
            });
        }

        let name = self.config.resolve_profile(profile_name)?;
        info!(profile = %name, "using Strata profile");

        let profile =
            self.config
                .profiles
                .get(&name)
                .ok_or_else(|| crate::config::ConfigError::ProfileNotFound {
                    name: name.clone(),
                })?;
        let (endpoint, access_key, secret_key) = profile.resolve_credentials()?;

        // Allow partial environment variable overrides on top of the profile
        if env_url.is_some() || env_access.is_some() || env_secret.is_some() {
            debug!("applying partial environment variable overrides");
        }

        Ok(ResolvedCredentials {
            endpoint: env_url.unwrap_or(endpoint),
            access_key: env_access.unwrap_or(access_key),
            secret_key: env_secret.unwrap_or(secret_key),
            insecure: profile.insecure,
            resilience: profile.resilience.clone().unwrap_or_default(),
        })
    }
}
