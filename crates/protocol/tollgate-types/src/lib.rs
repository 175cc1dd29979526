//! Data model for the Tollgate pay-per-call gateway.
//!
//! Every other Tollgate crate speaks in these types:
//!
//! - [`Amount`] / [`Currency`]: exact decimal prices and balances
//! - [`Network`]: testnet or mainnet
//! - [`Address`]: account identity derived from an Ed25519 public key
//! - [`ServiceId`] / [`ServiceDescriptor`]: what the directory resolves
//! - [`PaymentReceipt`] / [`ReceiptStatus`]: proof of payment
//! - [`ServiceRequest`] / [`RequestState`]: one invocation and its state machine
//! - [`ErrorKind`]: the failure taxonomy surfaced to callers

mod address;
mod amount;
pub mod duration_ms;
mod error;
mod network;
mod receipt;
mod request;
mod service;

pub use address::{Address, ADDRESS_PREFIX};
pub use amount::{Amount, Currency};
pub use error::{ErrorKind, TypesError, TypesResult};
pub use network::Network;
pub use receipt::{PaymentReceipt, ReceiptStatus, RequestId, TransactionId};
pub use request::{RequestState, ServiceRequest, StateTransition};
pub use service::{ServiceDescriptor, ServiceId, MAX_SERVICE_ID_LEN};

pub use url::Url;

/// Current Unix time in milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
