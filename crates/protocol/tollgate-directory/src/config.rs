//! Directory client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollgate_types::ServiceDescriptor;

/// Default directory URL.
pub const DEFAULT_DIRECTORY_URL: &str = "https://directory.tollgate.dev";

/// Configuration for the service directory.
///
/// When `services` is non-empty the listings are served from memory and
/// `base_url` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the HTTP directory
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(
        default = "default_request_timeout",
        with = "tollgate_types::duration_ms",
        rename = "request_timeout_ms"
    )]
    pub request_timeout: Duration,

    /// Static listings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceDescriptor>,
}

fn default_base_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            services: Vec::new(),
        }
    }
}

impl DirectoryConfig {
    /// HTTP directory at `base_url`.
    pub fn http(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Check if listings are served from memory.
    pub fn is_static(&self) -> bool {
        !self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DirectoryConfig::default();
        assert_eq!(config.base_url, DEFAULT_DIRECTORY_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.is_static());
    }

    #[test]
    fn test_parse_partial() {
        let config: DirectoryConfig =
            serde_json::from_str(r#"{"request_timeout_ms":2500}"#).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.base_url, DEFAULT_DIRECTORY_URL);
    }
}
