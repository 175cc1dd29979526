//! Error types for the settlement module.

use thiserror::Error;
use tollgate_account::AccountError;
use tollgate_types::{Amount, Currency, ErrorKind, PaymentReceipt, TypesError};

/// Result type alias for settlement operations.
pub type SettleResult<T> = Result<T, SettleError>;

/// Errors that can occur during settlement operations.
#[derive(Debug, Error)]
pub enum SettleError {
    /// Payer balance is below the price.
    #[error("insufficient funds: have {available} {currency}, need {required} {currency}")]
    InsufficientFunds {
        /// Balance at the time of the check
        available: Amount,
        /// Quoted price
        required: Amount,
        /// Currency of both amounts
        currency: Currency,
    },

    /// Confirmation was not observed before the deadline.
    ///
    /// The receipt is still pending; paying again with the same request id
    /// resumes it.
    #[error("settlement of {} not confirmed in time", .receipt.transaction_id)]
    Timeout {
        /// The pending receipt
        receipt: Box<PaymentReceipt>,
    },

    /// The settlement network refused the transfer.
    #[error("settlement rejected: {reason}")]
    Rejected {
        /// Reason given by the network
        reason: String,
        /// The failed receipt, once one exists
        receipt: Option<Box<PaymentReceipt>>,
    },

    /// Network error (retryable).
    #[error("network error: {0}")]
    Network(String),

    /// The settlement network answered with something we cannot use.
    #[error("invalid settlement response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Account error (balance query, nonce seeding).
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Data model error.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Internal error (unexpected state).
    #[error("internal error: {0}")]
    Internal(String),
}

impl SettleError {
    /// Create a new InsufficientFunds error.
    pub fn insufficient_funds(available: Amount, required: Amount, currency: Currency) -> Self {
        Self::InsufficientFunds {
            available,
            required,
            currency,
        }
    }

    /// Create a new Timeout error carrying the pending receipt.
    pub fn timeout(receipt: PaymentReceipt) -> Self {
        Self::Timeout {
            receipt: Box::new(receipt),
        }
    }

    /// Create a new Rejected error without a receipt.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
            receipt: None,
        }
    }

    /// Create a new Rejected error carrying the failed receipt.
    pub fn rejected_with(reason: impl Into<String>, receipt: PaymentReceipt) -> Self {
        Self::Rejected {
            reason: reason.into(),
            receipt: Some(Box::new(receipt)),
        }
    }

    /// Create a new Network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new InvalidResponse error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a new Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Account(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Map onto the gateway error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::Timeout { .. } => ErrorKind::SettlementTimeout,
            Self::Rejected { .. } => ErrorKind::SettlementRejected,
            Self::Network(_) | Self::InvalidResponse(_) => ErrorKind::NetworkUnavailable,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Account(e) => e.kind(),
            Self::Types(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The receipt attached to this error, if any.
    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        match self {
            Self::Timeout { receipt } => Some(&**receipt),
            Self::Rejected { receipt, .. } => receipt.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SettleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tollgate_types::{Address, RequestId, TransactionId};

    fn receipt() -> PaymentReceipt {
        PaymentReceipt::pending(
            TransactionId::new("ab".repeat(32)),
            RequestId::new(),
            Address::from_public_key(&[1u8; 32]),
            Address::from_public_key(&[2u8; 32]),
            Amount::from_str("0.01").unwrap(),
            Currency::Usdc,
        )
    }

    #[test]
    fn test_insufficient_funds_display() {
        let err = SettleError::insufficient_funds(
            Amount::ZERO,
            Amount::from_str("0.01").unwrap(),
            Currency::Usdc,
        );
        assert_eq!(
            err.to_string(),
            "insufficient funds: have 0 USDC, need 0.01 USDC"
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn test_receipt_attached() {
        let err = SettleError::timeout(receipt());
        assert_eq!(err.kind(), ErrorKind::SettlementTimeout);
        assert!(err.receipt().unwrap().is_pending());

        assert!(SettleError::rejected("bad nonce").receipt().is_none());
    }

    #[test]
    fn test_is_retryable() {
        assert!(SettleError::network("connection refused").is_retryable());
        assert!(SettleError::Account(AccountError::network_unavailable("x")).is_retryable());
        assert!(!SettleError::rejected("nope").is_retryable());
        assert!(!SettleError::timeout(receipt()).is_retryable());
    }

    #[test]
    fn test_account_kind_preserved() {
        let err = SettleError::from(AccountError::network_unavailable("ledger down"));
        assert_eq!(err.kind(), ErrorKind::NetworkUnavailable);
    }
}
