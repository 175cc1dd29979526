//! Resolve a service in the directory.

use tollgate_types::ServiceId;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render, ResolveOutput};
use crate::progress::with_spinner;

/// Execute the resolve command. Needs no account.
pub async fn resolve(config: CliConfig, format: OutputFormat, service_id: &str) -> CliResult<String> {
    let service_id =
        ServiceId::new(service_id).map_err(|e| CliError::user(e.to_string()))?;
    let directory = tollgate_directory::from_config(&config.directory)?;

    let descriptor = with_spinner(
        "Resolving service...",
        format,
        directory.resolve(&service_id),
    )
    .await?;

    let output = ResolveOutput {
        service_id: descriptor.service_id.to_string(),
        endpoint: descriptor.endpoint.to_string(),
        price: descriptor.price.to_string(),
        currency: descriptor.currency.to_string(),
        payee: descriptor.payee.to_string(),
    };
    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tollgate_types::{Address, Amount, Currency, ServiceDescriptor, Url};

    fn static_config() -> CliConfig {
        let mut config = CliConfig::default();
        config.directory.services = vec![ServiceDescriptor::new(
            ServiceId::new("tavily_search").unwrap(),
            Url::parse("https://services.test/tavily").unwrap(),
            Amount::from_str("0.01").unwrap(),
            Currency::Usdc,
            Address::from_public_key(&[5u8; 32]),
        )];
        config
    }

    #[tokio::test]
    async fn test_resolve_static_listing() {
        let output = resolve(static_config(), OutputFormat::Json, "tavily_search")
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["price"], "0.01");
        assert_eq!(json["currency"], "USDC");
        assert_eq!(json["endpoint"], "https://services.test/tavily");
    }

    #[tokio::test]
    async fn test_resolve_unknown_and_invalid() {
        let err = resolve(static_config(), OutputFormat::Json, "weather")
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = resolve(static_config(), OutputFormat::Json, "bad id")
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::User(_)));
    }
}
