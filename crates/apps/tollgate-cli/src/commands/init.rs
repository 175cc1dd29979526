//! Write a default configuration.

use std::path::Path;

use tollgate_account::{generate_key_file, CredentialSource};
use tollgate_types::Address;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{InitOutput, OutputFormat, Render};

/// Execute the init command.
///
/// With `key_file`, a fresh signing key is generated there and the config
/// points at it; otherwise the key is read from the environment.
pub fn init(
    config_path: &Path,
    format: OutputFormat,
    force: bool,
    key_file: Option<&Path>,
) -> CliResult<String> {
    if config_path.exists() && !force {
        return Err(CliError::ConfigExists(config_path.to_path_buf()));
    }

    let mut config = CliConfig::default();
    let mut address = None;
    if let Some(path) = key_file {
        let public_key = generate_key_file(path)?;
        address = Some(Address::from_public_key(&public_key).to_string());
        config.account.credential = CredentialSource::File {
            path: path.to_path_buf(),
        };
    }
    config.save(config_path)?;

    let credential = match &config.account.credential {
        CredentialSource::Env { var } => format!("${}", var),
        CredentialSource::File { path } => path.display().to_string(),
        CredentialSource::Generate => "ephemeral".to_string(),
    };
    let output = InitOutput {
        config_path: config_path.display().to_string(),
        network: config.account.network.to_string(),
        credential,
        address,
    };
    Ok(output.render(format))
}
