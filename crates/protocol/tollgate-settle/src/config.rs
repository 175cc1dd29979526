//! Configuration for the settlement engine and network client.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{SettleError, SettleResult};

/// Default settlement network URL.
pub const DEFAULT_LEDGER_URL: &str = "https://ledger.tollgate.dev";

/// Configuration for settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Base URL of the settlement network API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout
    #[serde(
        default = "default_request_timeout",
        with = "tollgate_types::duration_ms",
        rename = "request_timeout_ms"
    )]
    pub request_timeout: Duration,

    /// How long one `pay` call waits for confirmation
    #[serde(
        default = "default_confirmation_timeout",
        with = "tollgate_types::duration_ms",
        rename = "confirmation_timeout_ms"
    )]
    pub confirmation_timeout: Duration,

    /// Backoff between confirmation polls (`max_attempts` is unused)
    #[serde(default = "RetryConfig::polling")]
    pub poll: RetryConfig,

    /// Retry policy for transient submission failures
    #[serde(default)]
    pub submit_retry: RetryConfig,
}

fn default_base_url() -> String {
    DEFAULT_LEDGER_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_confirmation_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            confirmation_timeout: default_confirmation_timeout(),
            poll: RetryConfig::polling(),
            submit_retry: RetryConfig::default(),
        }
    }
}

impl SettleConfig {
    /// Settlement network at `base_url` with default timing.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SettleResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(SettleError::config("settlement base_url is empty"));
        }
        if self.submit_retry.max_attempts == 0 {
            return Err(SettleError::config("submit_retry.max_attempts must be at least 1"));
        }
        if self.poll.base_delay.is_zero() {
            return Err(SettleError::config("poll.base_delay_ms must be positive"));
        }
        Ok(())
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Base delay between retries
    #[serde(with = "tollgate_types::duration_ms", rename = "base_delay_ms")]
    pub base_delay: Duration,
    /// Maximum delay between retries
    #[serde(with = "tollgate_types::duration_ms", rename = "max_delay_ms")]
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Backoff used between confirmation polls.
    pub fn polling() -> Self {
        Self {
            max_attempts: u32::MAX,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SettleConfig::default();
        assert_eq!(config.base_url, DEFAULT_LEDGER_URL);
        assert_eq!(config.confirmation_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_default() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_parse_millis() {
        let json = r#"{
            "base_url": "http://localhost:8545",
            "confirmation_timeout_ms": 1200,
            "submit_retry": { "max_attempts": 5, "base_delay_ms": 50, "max_delay_ms": 800 }
        }"#;
        let config: SettleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.confirmation_timeout, Duration::from_millis(1200));
        assert_eq!(config.submit_retry.max_attempts, 5);
        assert_eq!(config.submit_retry.max_delay, Duration::from_millis(800));
        assert_eq!(config.poll, RetryConfig::polling());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = SettleConfig::new("http://localhost");
        config.submit_retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(SettleError::Config(_))));
    }
}
