//! Helper functions for creating test fixtures.
//!
//! Provides accounts, descriptors and a fully wired [`Gateway`] over the
//! in-memory [`MockLedger`] and [`RecordingExecutor`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tollgate_account::AccountManager;
use tollgate_directory::StaticDirectory;
use tollgate_gateway::{Gateway, GatewayConfig};
use tollgate_settle::{RetryConfig, SettleConfig, SettlementEngine};
use tollgate_types::{Address, Amount, Currency, Network, ServiceDescriptor, ServiceId, Url};

use crate::{MockLedger, RecordingExecutor};

/// Seed of the default test payer.
pub const PAYER_SEED: [u8; 32] = [7u8; 32];

/// Load environment variables from the workspace `.env` file.
///
/// Walks up from `CARGO_MANIFEST_DIR` to the `Cargo.toml` that declares
/// `[workspace]` and loads `.env` next to it. Variables already set are
/// kept. Safe to call from many tests.
pub fn try_load_dotenv() {
    let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let mut path = PathBuf::from(manifest_dir);
    loop {
        let cargo_toml = path.join("Cargo.toml");
        if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
            if contents.contains("[workspace]") {
                break;
            }
        }
        if !path.pop() {
            return;
        }
    }
    let _ = dotenvy::from_path(path.join(".env"));
}

/// Parse a decimal amount.
pub fn amount(value: &str) -> Amount {
    Amount::parse(value).expect("valid test amount")
}

/// Address that receives test payments.
pub fn test_payee() -> Address {
    Address::from_public_key(&[42u8; 32])
}

/// A USDC-priced descriptor at `https://services.test/{id}`.
pub fn test_descriptor(id: &str, price: &str) -> ServiceDescriptor {
    ServiceDescriptor::new(
        ServiceId::new(id).expect("valid test service id"),
        Url::parse(&format!("https://services.test/{id}")).expect("valid test url"),
        amount(price),
        Currency::Usdc,
        test_payee(),
    )
}

/// A testnet account backed by `ledger`.
pub fn test_account(ledger: &MockLedger, seed: [u8; 32]) -> Arc<AccountManager> {
    Arc::new(AccountManager::from_seed(
        seed,
        Network::Testnet,
        Arc::new(ledger.clone()),
    ))
}

/// A testnet account with `balance` on `ledger`.
pub fn funded_account(ledger: &MockLedger, seed: [u8; 32], balance: &str) -> Arc<AccountManager> {
    let account = test_account(ledger, seed);
    ledger.set_balance(account.get_address(), amount(balance));
    account
}

/// Settlement timing where every `pay` call polls exactly once.
pub fn fast_settle_config() -> SettleConfig {
    SettleConfig {
        confirmation_timeout: Duration::from_millis(20),
        poll: RetryConfig {
            max_attempts: u32::MAX,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(100),
        },
        submit_retry: RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(10),
        },
        ..SettleConfig::new("http://ledger.test")
    }
}

/// Gateway timing with short payment resumption delays.
pub fn fast_gateway_config() -> GatewayConfig {
    GatewayConfig {
        execution_timeout: Duration::from_secs(5),
        payment_retry: RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(10),
        },
        ..GatewayConfig::default()
    }
}

/// An engine over `ledger` with [`fast_settle_config`].
pub fn test_engine(ledger: &MockLedger) -> Arc<SettlementEngine> {
    Arc::new(SettlementEngine::new(
        Arc::new(ledger.clone()),
        &fast_settle_config(),
    ))
}

/// The two stock services: `tavily_search` at 0.01 and `gpt_researcher` at 0.05.
pub fn stock_directory() -> StaticDirectory {
    StaticDirectory::new([
        test_descriptor("tavily_search", "0.01"),
        test_descriptor("gpt_researcher", "0.05"),
    ])
}

/// A wired gateway and the doubles behind it.
pub struct TestGateway {
    /// The gateway under test
    pub gateway: Gateway,
    /// Ledger and settlement network
    pub ledger: MockLedger,
    /// Service backend
    pub executor: RecordingExecutor,
    /// Paying account
    pub payer: Address,
}

impl TestGateway {
    /// Gateway over the stock directory with a payer holding `balance`.
    pub fn new(ledger: MockLedger, executor: RecordingExecutor, balance: &str) -> Self {
        Self::with_config(ledger, executor, balance, &fast_gateway_config())
    }

    /// Same as [`new`](Self::new) with an explicit gateway config.
    pub fn with_config(
        ledger: MockLedger,
        executor: RecordingExecutor,
        balance: &str,
        config: &GatewayConfig,
    ) -> Self {
        let account = funded_account(&ledger, PAYER_SEED, balance);
        let payer = account.get_address();
        let gateway = Gateway::new(
            Arc::new(stock_directory()),
            test_engine(&ledger),
            account,
            Arc::new(executor.clone()),
            config,
        );
        Self {
            gateway,
            ledger,
            executor,
            payer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_fields() {
        let d = test_descriptor("tavily_search", "0.01");
        assert_eq!(d.service_id.as_str(), "tavily_search");
        assert_eq!(d.endpoint.as_str(), "https://services.test/tavily_search");
        assert_eq!(d.price, amount("0.01"));
        assert_eq!(d.payee, test_payee());
    }

    #[test]
    fn test_funded_account() {
        let ledger = MockLedger::new();
        let account = funded_account(&ledger, PAYER_SEED, "2.5");
        assert_eq!(ledger.balance_of(&account.get_address()), amount("2.5"));
    }

    #[test]
    fn test_fast_configs_are_valid() {
        assert!(fast_settle_config().validate().is_ok());
        assert!(
            fast_settle_config().confirmation_timeout
                < fast_settle_config().poll.base_delay * 3 / 4
        );
        assert_eq!(fast_gateway_config().payment_retry.max_attempts, 3);
    }

    #[test]
    fn test_try_load_dotenv_is_idempotent() {
        try_load_dotenv();
        try_load_dotenv();
    }
}
