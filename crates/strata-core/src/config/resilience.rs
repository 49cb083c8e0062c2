//! Resilience configuration
//!
//! Per-profile settings for the request retry primitive and the operation
//! poller's clamp bounds.

use serde::{Deserialize, Serialize};

/// Configuration for resilience behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Request retry configuration (token acquisition and other explicitly
    /// wrapped calls)
    #[serde(default)]
    pub retry: RetryConfig,

    /// Operation poll clamp configuration
    #[serde(default)]
    pub poll: PollConfig,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Whether retry is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            backoff_ms: 500,
            max_backoff_ms: 8000,
        }
    }
}

/// Operation poll clamp configuration
///
/// The server's `retry_in` hint is advisory; these bounds keep a zero or
/// missing hint from busy-looping and an unreasonably large hint from making
/// cancellation unresponsive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Minimum sleep between polls, in milliseconds
    #[serde(default = "default_poll_floor_ms")]
    pub floor_ms: u64,

    /// Maximum single sleep, in milliseconds
    #[serde(default = "default_poll_ceiling_ms")]
    pub ceiling_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            floor_ms: 500,
            ceiling_ms: 30_000,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8000
}

fn default_poll_floor_ms() -> u64 {
    500
}

fn default_poll_ceiling_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();
        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.poll.floor_ms, 500);
        assert_eq!(config.poll.ceiling_ms, 30_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ResilienceConfig = toml::from_str(
            r#"
            [retry]
            max_attempts = 5

            [poll]
            floor_ms = 100
            "#,
        )
        .unwrap();

        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_ms, 500);
        assert_eq!(config.poll.floor_ms, 100);
        assert_eq!(config.poll.ceiling_ms, 30_000);
    }
}
