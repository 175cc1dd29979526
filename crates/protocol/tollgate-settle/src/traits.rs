//! Settlement network trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tollgate_account::SignedTransfer;
use tollgate_types::TransactionId;

use crate::error::SettleResult;

/// State of a transaction as reported by the settlement network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Accepted, awaiting finality.
    Pending,
    /// Final and successful.
    Confirmed,
    /// Rejected or reverted.
    Failed {
        /// Reason given by the network
        reason: String,
    },
    /// The network has never seen this transaction.
    Unknown,
}

impl TransactionStatus {
    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed { .. } => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Access to the settlement network.
///
/// Submissions are idempotent by transaction id: submitting a transfer the
/// network already knows returns its current status instead of a new
/// transaction.
#[async_trait]
pub trait SettlementNetwork: Send + Sync {
    /// Broadcast a signed transfer.
    ///
    /// An explicit refusal is reported as
    /// [`SettleError::Rejected`](crate::SettleError::Rejected); transport
    /// failures as [`SettleError::Network`](crate::SettleError::Network).
    async fn submit(&self, transfer: &SignedTransfer) -> SettleResult<TransactionStatus>;

    /// Current status of a transaction.
    async fn transaction_status(&self, id: &TransactionId) -> SettleResult<TransactionStatus>;
}
