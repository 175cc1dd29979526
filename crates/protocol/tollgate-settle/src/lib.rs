//! Payment settlement for Tollgate.
//!
//! The [`SettlementEngine`] pays a service's quoted price from an
//! [`AccountManager`](tollgate_account::AccountManager) and returns a
//! [`PaymentReceipt`](tollgate_types::PaymentReceipt) once the transfer is
//! confirmed. Payments are idempotent per request id.
//!
//! The settlement network itself is abstracted behind [`SettlementNetwork`];
//! [`HttpSettlementNetwork`] talks to a JSON-over-HTTP ledger and doubles as
//! the account's balance source.

mod config;
mod engine;
mod error;
mod http;
mod retry;
mod traits;

pub use config::{RetryConfig, SettleConfig, DEFAULT_LEDGER_URL};
pub use engine::SettlementEngine;
pub use error::{SettleError, SettleResult};
pub use http::HttpSettlementNetwork;
pub use retry::RetryPolicy;
pub use traits::{SettlementNetwork, TransactionStatus};
