//! Configuration and profile management
//!
// Allow nested config module - this is intentional for the config subsystem
#![allow(clippy::module_inception)]
//!
//! Profiles name a Strata control plane (endpoint + access-key credentials)
//! and live in a TOML file under the platform config directory. Values
//! support `${VAR}` environment expansion so secrets can stay out of the
//! file. Per-profile resilience settings tune the retry primitive and the
//! poll clamp bounds.

pub mod config;
pub mod error;
pub mod resilience;

// Re-export main types for convenience
pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
pub use resilience::{PollConfig, ResilienceConfig, RetryConfig};
