//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollgate_settle::RetryConfig;
use tollgate_types::{Amount, Currency};

/// Configuration for the [`Gateway`](crate::Gateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Default bound on one service call
    #[serde(
        default = "default_execution_timeout",
        with = "tollgate_types::duration_ms",
        rename = "execution_timeout_ms"
    )]
    pub execution_timeout: Duration,

    /// How often a pending payment is resumed before giving up
    #[serde(default = "default_payment_retry")]
    pub payment_retry: RetryConfig,

    /// Optional session spending cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Amount>,

    /// Currency of the spending cap
    #[serde(default)]
    pub budget_currency: Currency,
}

fn default_execution_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_payment_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            execution_timeout: default_execution_timeout(),
            payment_retry: default_payment_retry(),
            budget: None,
            budget_currency: Currency::default(),
        }
    }
}

impl GatewayConfig {
    /// Set a session budget.
    pub fn with_budget(mut self, limit: Amount) -> Self {
        self.budget = Some(limit);
        self
    }
}
