//! The account manager.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use tollgate_types::{Address, Amount, Currency, Network};

use crate::config::AccountConfig;
use crate::error::AccountResult;
use crate::keys::SigningMaterial;
use crate::ledger::BalanceSource;
use crate::nonce::{NonceAllocator, NonceReservation};
use crate::transfer::{SignedTransfer, TransferIntent};

/// Owns the gateway's payer account.
///
/// Holds the signing seed, derives the address, answers balance queries and
/// hands out nonces one payment at a time. The seed never leaves this type.
pub struct AccountManager {
    address: Address,
    network: Network,
    keys: SigningMaterial,
    ledger: Arc<dyn BalanceSource>,
    nonces: NonceAllocator,
}

impl AccountManager {
    /// Load the account described by `config`.
    pub fn new(config: &AccountConfig, ledger: Arc<dyn BalanceSource>) -> AccountResult<Self> {
        let keys = SigningMaterial::load(&config.credential)?;
        let manager = Self::with_material(keys, config.network, ledger);
        info!(
            address = %manager.address,
            network = %manager.network,
            "loaded account"
        );
        Ok(manager)
    }

    /// Build an account from a raw seed.
    pub fn from_seed(seed: [u8; 32], network: Network, ledger: Arc<dyn BalanceSource>) -> Self {
        Self::with_material(SigningMaterial::from_seed(seed), network, ledger)
    }

    fn with_material(
        keys: SigningMaterial,
        network: Network,
        ledger: Arc<dyn BalanceSource>,
    ) -> Self {
        let address = Address::from_public_key(&keys.public_key());
        Self {
            address,
            network,
            keys,
            ledger,
            nonces: NonceAllocator::new(),
        }
    }

    /// The account's address. Stable for the lifetime of the key.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Owned copy of the address.
    pub fn get_address(&self) -> Address {
        self.address
    }

    /// Network this account pays on.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.keys.public_key()
    }

    /// Current balance in `currency`, read from the ledger.
    #[instrument(skip(self), fields(address = %self.address))]
    pub async fn get_balance(&self, currency: Currency) -> AccountResult<Amount> {
        match self.ledger.balance(&self.address, currency).await {
            Ok(amount) => {
                debug!(%amount, %currency, "balance fetched");
                Ok(amount)
            }
            Err(e) => {
                warn!(error = %e, "balance query failed");
                Err(e)
            }
        }
    }

    /// Reserve the next nonce.
    ///
    /// Waits while another payment from this account holds a reservation.
    pub async fn reserve_nonce(&self) -> AccountResult<NonceReservation<'_>> {
        self.nonces
            .reserve(self.ledger.next_nonce(&self.address))
            .await
    }

    /// Drop the cached nonce after an ambiguous or rejected submission.
    pub async fn reset_nonce(&self) {
        self.nonces.reset().await;
    }

    /// Sign `intent` with the reserved nonce.
    pub fn sign_transfer(
        &self,
        reservation: &NonceReservation<'_>,
        intent: &TransferIntent,
    ) -> SignedTransfer {
        let nonce = reservation.nonce();
        let message = SignedTransfer::signing_bytes(
            &self.address,
            &intent.payee,
            &intent.amount,
            intent.currency,
            self.network,
            nonce,
            &intent.reference,
        );
        let signature = self.keys.sign(&message);
        debug!(nonce, reference = %intent.reference, "signed transfer");

        SignedTransfer {
            payer: self.address,
            payee: intent.payee,
            amount: intent.amount,
            currency: intent.currency,
            network: self.network,
            nonce,
            reference: intent.reference,
            public_key: hex::encode(self.keys.public_key()),
            signature: hex::encode(signature),
        }
    }
}

impl fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountManager")
            .field("address", &self.address)
            .field("network", &self.network)
            .field("keys", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::str::FromStr;

    use crate::error::AccountError;

    struct FixedLedger {
        balance: Option<Amount>,
    }

    #[async_trait]
    impl BalanceSource for FixedLedger {
        async fn balance(&self, _: &Address, _: Currency) -> AccountResult<Amount> {
            self.balance
                .ok_or_else(|| AccountError::network_unavailable("connection refused"))
        }

        async fn next_nonce(&self, _: &Address) -> AccountResult<u64> {
            Ok(7)
        }
    }

    fn manager(balance: Option<Amount>) -> AccountManager {
        AccountManager::from_seed(
            [3u8; 32],
            Network::Testnet,
            Arc::new(FixedLedger { balance }),
        )
    }

    #[test]
    fn test_address_is_deterministic() {
        let a = manager(None);
        let b = manager(None);
        assert_eq!(a.address(), b.address());
        assert_eq!(
            a.get_address(),
            Address::from_public_key(&a.public_key())
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", manager(None));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex::encode([3u8; 32])));
    }

    #[tokio::test]
    async fn test_balance_passthrough() {
        let m = manager(Some(Amount::from_str("12.5").unwrap()));
        let balance = m.get_balance(Currency::Usdc).await.unwrap();
        assert_eq!(balance, Amount::from_str("12.5").unwrap());
    }

    #[tokio::test]
    async fn test_balance_network_unavailable() {
        let m = manager(None);
        let err = m.get_balance(Currency::Usdc).await.unwrap_err();
        assert!(matches!(err, AccountError::NetworkUnavailable(_)));
    }

    #[tokio::test]
    async fn test_signed_transfer_verifies() {
        let m = manager(None);
        let payee = Address::from_public_key(&[8u8; 32]);
        let intent = TransferIntent {
            payee,
            amount: Amount::from_str("0.25").unwrap(),
            currency: Currency::Usdc,
            reference: tollgate_types::RequestId::new(),
        };

        let reservation = m.reserve_nonce().await.unwrap();
        assert_eq!(reservation.nonce(), 7);
        let transfer = m.sign_transfer(&reservation, &intent);
        reservation.commit();

        assert!(transfer.verify());
        assert_eq!(transfer.payer, *m.address());
        assert_eq!(transfer.nonce, 7);

        let next = m.reserve_nonce().await.unwrap();
        assert_eq!(next.nonce(), 8);
    }
}
