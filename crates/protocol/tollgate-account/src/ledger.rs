//! Read-only ledger access.

use async_trait::async_trait;
use tollgate_types::{Address, Amount, Currency};

use crate::error::AccountResult;

/// Read-only view of the settlement ledger used by the account manager.
///
/// Implementations map transport failures to
/// [`AccountError::NetworkUnavailable`](crate::AccountError::NetworkUnavailable).
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Balance of `address` in `currency`.
    async fn balance(&self, address: &Address, currency: Currency) -> AccountResult<Amount>;

    /// The next nonce the ledger expects from `address`.
    ///
    /// Only consulted when the account's local counter is cold.
    async fn next_nonce(&self, address: &Address) -> AccountResult<u64>;
}
