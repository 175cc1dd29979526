//! Signed value transfers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tollgate_types::{Address, Amount, Currency, Network, RequestId, TransactionId};

use crate::keys::verify_signature;

/// Domain tag prefixed to every signed transfer.
const TRANSFER_DOMAIN: &str = "tollgate-transfer-v1";

/// What the payer wants to send, before a nonce and signature are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    /// Receiving account.
    pub payee: Address,
    /// Amount to send.
    pub amount: Amount,
    /// Currency of the amount.
    pub currency: Currency,
    /// Logical request being paid for (idempotency key).
    pub reference: RequestId,
}

/// A transfer signed by the payer's account.
///
/// This is also the submission body sent to the settlement network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransfer {
    pub payer: Address,
    pub payee: Address,
    pub amount: Amount,
    pub currency: Currency,
    pub network: Network,
    pub nonce: u64,
    pub reference: RequestId,
    /// Hex-encoded Ed25519 public key of the payer.
    pub public_key: String,
    /// Hex-encoded signature over [`SignedTransfer::signing_bytes`].
    pub signature: String,
}

impl SignedTransfer {
    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(
        payer: &Address,
        payee: &Address,
        amount: &Amount,
        currency: Currency,
        network: Network,
        nonce: u64,
        reference: &RequestId,
    ) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            TRANSFER_DOMAIN, payer, payee, amount, currency, network, nonce, reference
        )
        .into_bytes()
    }

    fn own_signing_bytes(&self) -> Vec<u8> {
        Self::signing_bytes(
            &self.payer,
            &self.payee,
            &self.amount,
            self.currency,
            self.network,
            self.nonce,
            &self.reference,
        )
    }

    /// Transaction ID: hex `SHA-256(signing_bytes || signature)`.
    ///
    /// Derived locally, so the payer knows the ID before the network answers.
    pub fn transaction_id(&self) -> TransactionId {
        let mut hasher = Sha256::new();
        hasher.update(self.own_signing_bytes());
        hasher.update(self.signature.as_bytes());
        TransactionId::new(hex::encode(hasher.finalize()))
    }

    /// Check the signature and that the public key owns `payer`.
    pub fn verify(&self) -> bool {
        let Some(public_key) = decode_fixed::<32>(&self.public_key) else {
            return false;
        };
        let Some(signature) = decode_fixed::<64>(&self.signature) else {
            return false;
        };
        Address::from_public_key(&public_key) == self.payer
            && verify_signature(&public_key, &self.own_signing_bytes(), &signature)
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    hex::decode(s).ok()?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SigningMaterial;
    use std::str::FromStr;

    fn signed(nonce: u64) -> SignedTransfer {
        let keys = SigningMaterial::from_seed([5u8; 32]);
        let payer = Address::from_public_key(&keys.public_key());
        let payee = Address::from_public_key(&[6u8; 32]);
        let amount = Amount::from_str("1.5").unwrap();
        let reference = RequestId::new();
        let message = SignedTransfer::signing_bytes(
            &payer,
            &payee,
            &amount,
            Currency::Usdc,
            Network::Testnet,
            nonce,
            &reference,
        );
        SignedTransfer {
            payer,
            payee,
            amount,
            currency: Currency::Usdc,
            network: Network::Testnet,
            nonce,
            reference,
            public_key: hex::encode(keys.public_key()),
            signature: hex::encode(keys.sign(&message)),
        }
    }

    #[test]
    fn test_verify_detects_tampering() {
        let transfer = signed(1);
        assert!(transfer.verify());

        let mut tampered = transfer.clone();
        tampered.amount = Amount::from_str("150").unwrap();
        assert!(!tampered.verify());

        let mut wrong_payer = transfer;
        wrong_payer.payer = Address::from_public_key(&[7u8; 32]);
        assert!(!wrong_payer.verify());
    }

    #[test]
    fn test_transaction_id_is_stable() {
        let transfer = signed(4);
        let id = transfer.transaction_id();
        assert_eq!(id, transfer.clone().transaction_id());
        assert_eq!(id.as_str().len(), 64);
    }

    #[test]
    fn test_wire_shape() {
        let transfer = signed(2);
        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["amount"], "1.5");
        assert_eq!(json["currency"], "USDC");
        assert_eq!(json["network"], "testnet");
        assert_eq!(json["nonce"], 2);

        let back: SignedTransfer = serde_json::from_value(json).unwrap();
        assert_eq!(back, transfer);
    }
}
