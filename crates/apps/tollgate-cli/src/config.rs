//! CLI configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tollgate_account::AccountConfig;
use tollgate_directory::DirectoryConfig;
use tollgate_gateway::GatewayConfig;
use tollgate_settle::SettleConfig;

use crate::error::{CliError, CliResult};

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unset variables are left as written.
fn expand_env_vars(input: &str) -> CliResult<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| CliError::config(format!("bad expansion pattern: {}", e)))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string())
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Paying account.
    pub account: AccountConfig,
    /// Service directory.
    pub directory: DirectoryConfig,
    /// Settlement network and timing.
    pub settlement: SettleConfig,
    /// Orchestrator timing and budget.
    pub gateway: GatewayConfig,
}

impl CliConfig {
    /// Load configuration from a file, or defaults if it does not exist.
    ///
    /// `${VAR}` references in endpoint URLs are expanded.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        config.directory.base_url = expand_env_vars(&config.directory.base_url)?;
        config.settlement.base_url = expand_env_vars(&config.settlement.base_url)?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the gateway cannot run with.
    pub fn validate(&self) -> CliResult<()> {
        self.settlement.validate()?;
        if !self.directory.is_static() && self.directory.base_url.trim().is_empty() {
            return Err(CliError::config("directory.base_url is empty"));
        }
        if self.gateway.payment_retry.max_attempts == 0 {
            return Err(CliError::config(
                "gateway.payment_retry.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Get the base directory for Tollgate files.
pub fn default_base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TOLLGATE_HOME") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("dev", "tollgate", "tollgate")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".tollgate")
        })
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_base_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tollgate_account::CredentialSource;
    use tollgate_types::Network;

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = CliConfig::default();
        config.account.network = Network::Mainnet;
        config.settlement.confirmation_timeout = Duration::from_secs(5);
        config.gateway.budget = Some(tollgate_types::Amount::parse("2.5").unwrap());
        config.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[account]
network = "testnet"

[account.credential]
source = "file"
path = "/keys/payer.key"

[settlement]
base_url = "http://localhost:8080"
confirmation_timeout_ms = 1500
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(
            config.account.credential,
            CredentialSource::File {
                path: PathBuf::from("/keys/payer.key")
            }
        );
        assert_eq!(config.settlement.base_url, "http://localhost:8080");
        assert_eq!(
            config.settlement.confirmation_timeout,
            Duration::from_millis(1500)
        );
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_env_expansion_in_urls() {
        std::env::set_var("TOLLGATE_TEST_LEDGER_HOST", "ledger.internal");
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[settlement]
base_url = "https://${TOLLGATE_TEST_LEDGER_HOST}/v1"

[directory]
base_url = "https://${TOLLGATE_TEST_UNSET_VAR}/dir"
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.settlement.base_url, "https://ledger.internal/v1");
        assert_eq!(
            config.directory.base_url,
            "https://${TOLLGATE_TEST_UNSET_VAR}/dir"
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[gateway.payment_retry]\nmax_attempts = 0\nbase_delay_ms = 10\nmax_delay_ms = 10\n").unwrap();
        assert!(matches!(CliConfig::load(&path), Err(CliError::Config(_))));

        std::fs::write(&path, "[account\n").unwrap();
        assert!(matches!(CliConfig::load(&path), Err(CliError::Toml(_))));
    }
}
