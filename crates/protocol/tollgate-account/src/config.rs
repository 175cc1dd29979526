//! Account construction parameters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tollgate_types::Network;

/// Default environment variable holding the hex-encoded signing seed.
pub const DEFAULT_KEY_ENV: &str = "TOLLGATE_PRIVATE_KEY";

/// Where the account's signing seed comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum CredentialSource {
    /// Hex-encoded 32-byte seed in an environment variable.
    Env {
        /// Variable name
        var: String,
    },
    /// Hex-encoded 32-byte seed in a file.
    File {
        /// Path to the key file
        path: PathBuf,
    },
    /// Fresh random key, lost when the process exits.
    Generate,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::Env {
            var: DEFAULT_KEY_ENV.to_string(),
        }
    }
}

/// Configuration for an [`AccountManager`](crate::AccountManager).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Which network the account pays on
    #[serde(default)]
    pub network: Network,

    /// Signing seed source
    #[serde(default)]
    pub credential: CredentialSource,
}

impl AccountConfig {
    /// Testnet account reading its key from `var`.
    pub fn testnet_from_env(var: &str) -> Self {
        Self {
            network: Network::Testnet,
            credential: CredentialSource::Env {
                var: var.to_string(),
            },
        }
    }

    /// Account reading its key from a file.
    pub fn from_key_file(network: Network, path: PathBuf) -> Self {
        Self {
            network,
            credential: CredentialSource::File { path },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reads_env() {
        let config = AccountConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(
            config.credential,
            CredentialSource::Env {
                var: DEFAULT_KEY_ENV.to_string()
            }
        );
    }

    #[test]
    fn test_credential_serde() {
        let json = r#"{"network":"mainnet","credential":{"source":"file","path":"/keys/a.key"}}"#;
        let config: AccountConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(
            config.credential,
            CredentialSource::File {
                path: PathBuf::from("/keys/a.key")
            }
        );
    }
}
