//! Configuration loading and profile resolution
//!
//! Configuration is stored in TOML format with support for multiple named
//! profiles. The file location follows platform conventions and can be
//! overridden with the `STRATA_CONFIG` environment variable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, Result};
use super::resilience::ResilienceConfig;

/// Environment variable overriding the config file location
pub const ENV_CONFIG_PATH: &str = "STRATA_CONFIG";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when the caller does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    /// API endpoint, e.g. `https://api.strata.example.com/v1`
    pub endpoint: String,
    /// Access key presented to the token endpoint. Supports `${VAR}`
    /// expansion.
    pub access_key: String,
    /// Secret key presented to the token endpoint. Supports `${VAR}`
    /// expansion.
    pub secret_key: String,
    /// Accept invalid TLS certificates (self-signed test deployments)
    #[serde(default)]
    pub insecure: bool,
    /// Resilience configuration for this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resilience: Option<ResilienceConfig>,
}

impl Config {
    /// Platform config file location, honoring `STRATA_CONFIG`
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("dev", "strata", "strata").ok_or(ConfigError::ConfigDirError)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file is not an error; it yields the default (empty)
    /// configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_path()?)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::SaveError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Resolve the profile to use
    ///
    /// Precedence: an explicitly named profile, then `default_profile`, then
    /// a sole configured profile.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<String> {
        if let Some(name) = name {
            if self.profiles.contains_key(name) {
                return Ok(name.to_string());
            }
            return Err(ConfigError::ProfileNotFound {
                name: name.to_string(),
            });
        }

        if let Some(default) = &self.default_profile {
            if self.profiles.contains_key(default) {
                return Ok(default.clone());
            }
            return Err(ConfigError::ProfileNotFound {
                name: default.clone(),
            });
        }

        if self.profiles.len() == 1 {
            if let Some(name) = self.profiles.keys().next() {
                return Ok(name.clone());
            }
        }

        Err(ConfigError::NoProfileConfigured)
    }
}

impl Profile {
    /// Resolve endpoint and credentials, expanding `${VAR}` references
    pub fn resolve_credentials(&self) -> Result<(String, String, String)> {
        Ok((
            expand(&self.endpoint)?,
            expand(&self.access_key)?,
            expand(&self.secret_key)?,
        ))
    }
}

fn expand(value: &str) -> Result<String> {
    shellexpand::env(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::EnvExpansionError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(endpoint: &str) -> Profile {
        Profile {
            endpoint: endpoint.to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            insecure: false,
            resilience: None,
        }
    }

    #[test]
    fn test_resolve_explicit_profile() {
        let mut config = Config::default();
        config
            .profiles
            .insert("prod".to_string(), profile("https://prod.example.com"));

        assert_eq!(config.resolve_profile(Some("prod")).unwrap(), "prod");
        assert!(matches!(
            config.resolve_profile(Some("staging")),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_default_profile() {
        let mut config = Config::default();
        config
            .profiles
            .insert("prod".to_string(), profile("https://prod.example.com"));
        config
            .profiles
            .insert("dev".to_string(), profile("https://dev.example.com"));
        config.default_profile = Some("dev".to_string());

        assert_eq!(config.resolve_profile(None).unwrap(), "dev");
    }

    #[test]
    fn test_resolve_sole_profile() {
        let mut config = Config::default();
        config
            .profiles
            .insert("only".to_string(), profile("https://only.example.com"));

        assert_eq!(config.resolve_profile(None).unwrap(), "only");
    }

    #[test]
    fn test_resolve_ambiguous_without_default() {
        let mut config = Config::default();
        config
            .profiles
            .insert("a".to_string(), profile("https://a.example.com"));
        config
            .profiles
            .insert("b".to_string(), profile("https://b.example.com"));

        assert!(matches!(
            config.resolve_profile(None),
            Err(ConfigError::NoProfileConfigured)
        ));
    }

    #[test]
    fn test_plain_values_expand_to_themselves() {
        let profile = profile("https://prod.example.com");
        let (endpoint, access_key, secret_key) = profile.resolve_credentials().unwrap();
        assert_eq!(endpoint, "https://prod.example.com");
        assert_eq!(access_key, "ak");
        assert_eq!(secret_key, "sk");
    }
}
