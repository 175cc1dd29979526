//! Payer account management for Tollgate.
//!
//! The [`AccountManager`] owns the gateway's signing key. It derives the
//! account [`Address`](tollgate_types::Address), reads balances through a
//! [`BalanceSource`], and serializes nonce use so concurrent payments from
//! the same account never reuse or skip a nonce.
//!
//! # Example
//!
//! ```ignore
//! let account = AccountManager::new(&AccountConfig::default(), ledger)?;
//! let reservation = account.reserve_nonce().await?;
//! let transfer = account.sign_transfer(&reservation, &intent);
//! // submit `transfer`, then:
//! reservation.commit();
//! ```

mod config;
mod error;
mod keys;
mod ledger;
mod manager;
mod nonce;
mod transfer;

pub use config::{AccountConfig, CredentialSource, DEFAULT_KEY_ENV};
pub use error::{AccountError, AccountResult};
pub use keys::{generate_key_file, verify_signature};
pub use ledger::BalanceSource;
pub use manager::AccountManager;
pub use nonce::{NonceAllocator, NonceReservation};
pub use transfer::{SignedTransfer, TransferIntent};
