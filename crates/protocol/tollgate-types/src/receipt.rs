//! Payment receipts and the identifiers that key them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;
use crate::amount::{Amount, Currency};
use crate::error::{TypesError, TypesResult};

/// Settlement transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a new transaction ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the transaction ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one logical service request.
///
/// This is the idempotency key for payment: every retry of the same logical
/// request must reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a fresh random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a request ID from its hyphenated form.
    pub fn parse(s: &str) -> TypesResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypesError::InvalidRequestId(format!("{}: {}", s, e)))
    }

    /// Raw UUID bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a settlement as seen by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReceiptStatus {
    /// Submitted, not yet confirmed.
    Pending,
    /// Confirmed on the settlement network.
    Confirmed,
    /// Rejected or reverted.
    Failed {
        /// Why the settlement failed.
        reason: String,
    },
}

impl ReceiptStatus {
    /// Check if the status is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if the status is confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Check if the status is failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed ({})", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Proof that a settlement was submitted, and how it ended.
///
/// Created `pending` at submission. Moves exactly once to `confirmed` or
/// `failed` and never reverts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Settlement transaction ID.
    pub transaction_id: TransactionId,
    /// Logical request this payment belongs to.
    pub request_id: RequestId,
    /// Paying account.
    pub payer: Address,
    /// Receiving account.
    pub payee: Address,
    /// Amount transferred.
    pub amount: Amount,
    /// Currency of the amount.
    pub currency: Currency,
    status: ReceiptStatus,
}

impl PaymentReceipt {
    /// Create a receipt in the `pending` state.
    pub fn pending(
        transaction_id: TransactionId,
        request_id: RequestId,
        payer: Address,
        payee: Address,
        amount: Amount,
        currency: Currency,
    ) -> Self {
        Self {
            transaction_id,
            request_id,
            payer,
            payee,
            amount,
            currency,
            status: ReceiptStatus::Pending,
        }
    }

    /// Current status.
    pub fn status(&self) -> &ReceiptStatus {
        &self.status
    }

    /// Mark the receipt confirmed. Only valid from `pending`.
    pub fn confirm(&mut self) -> TypesResult<()> {
        self.finalize(ReceiptStatus::Confirmed)
    }

    /// Mark the receipt failed. Only valid from `pending`.
    pub fn fail(&mut self, reason: impl Into<String>) -> TypesResult<()> {
        self.finalize(ReceiptStatus::Failed {
            reason: reason.into(),
        })
    }

    fn finalize(&mut self, status: ReceiptStatus) -> TypesResult<()> {
        if !self.status.is_pending() {
            return Err(TypesError::ReceiptFinal {
                transaction_id: self.transaction_id.to_string(),
                status: self.status.label().to_string(),
            });
        }
        self.status = status;
        Ok(())
    }

    /// Check if the receipt is pending.
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Check if the receipt is confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.status.is_confirmed()
    }

    /// Check if the receipt is failed.
    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }
}
