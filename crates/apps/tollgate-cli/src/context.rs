//! Wiring of the gateway components from configuration.

use std::sync::Arc;

use tollgate_account::AccountManager;
use tollgate_directory::ServiceDirectory;
use tollgate_gateway::{Gateway, HttpExecutor};
use tollgate_settle::{HttpSettlementNetwork, SettlementEngine};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Account, ledger client and directory built from one configuration.
pub struct GatewayContext {
    /// Paying account.
    pub account: Arc<AccountManager>,
    /// Settlement network client; also the account's balance source.
    pub network: Arc<HttpSettlementNetwork>,
    /// Service directory.
    pub directory: Arc<dyn ServiceDirectory>,
    /// Configuration.
    pub config: CliConfig,
}

impl GatewayContext {
    /// Build the components. Performs no network calls.
    pub fn new(config: CliConfig) -> CliResult<Self> {
        let network = Arc::new(HttpSettlementNetwork::from_config(&config.settlement)?);
        let account = Arc::new(AccountManager::new(&config.account, network.clone())?);
        let directory = tollgate_directory::from_config(&config.directory)?;

        Ok(Self {
            account,
            network,
            directory,
            config,
        })
    }

    /// Assemble a gateway that pays on the configured network.
    pub fn gateway(&self) -> CliResult<Gateway> {
        let engine = Arc::new(SettlementEngine::new(
            self.network.clone(),
            &self.config.settlement,
        ));
        let executor = HttpExecutor::new()
            .map_err(|e| CliError::config(format!("cannot create service client: {}", e)))?;

        Ok(Gateway::new(
            self.directory.clone(),
            engine,
            self.account.clone(),
            Arc::new(executor),
            &self.config.gateway,
        ))
    }
}
