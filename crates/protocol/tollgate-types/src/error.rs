//! Error kinds shared by every Tollgate crate.
//!
//! [`ErrorKind`] is the stable taxonomy surfaced to callers of the gateway.
//! Each crate has its own error enum that maps onto one of these kinds, so
//! the originating kind survives propagation through the orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::RequestState;

/// Result type for data model operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Failure kinds surfaced by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// The ledger could not be queried.
    NetworkUnavailable,
    /// The directory does not list the requested service.
    UnknownService,
    /// The directory could not be reached or answered garbage.
    DirectoryUnavailable,
    /// The payer's balance is below the quoted price.
    InsufficientFunds,
    /// Confirmation was not observed within the bounded wait.
    SettlementTimeout,
    /// The settlement network refused the transfer.
    SettlementRejected,
    /// The payment stayed pending for longer than the orchestrator allows.
    PaymentTimeout,
    /// The paid endpoint failed or could not be reached.
    ServiceExecutionError,
    /// The session spending cap would be exceeded.
    BudgetExceeded,
    /// The caller cancelled the invocation.
    Cancelled,
    /// Invalid or missing configuration.
    Configuration,
    /// Unexpected internal state.
    Internal,
}

impl ErrorKind {
    /// Stable identifier for logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable => "network_unavailable",
            Self::UnknownService => "unknown_service",
            Self::DirectoryUnavailable => "directory_unavailable",
            Self::InsufficientFunds => "insufficient_funds",
            Self::SettlementTimeout => "settlement_timeout",
            Self::SettlementRejected => "settlement_rejected",
            Self::PaymentTimeout => "payment_timeout",
            Self::ServiceExecutionError => "service_execution_error",
            Self::BudgetExceeded => "budget_exceeded",
            Self::Cancelled => "cancelled",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }

    /// Get a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NetworkUnavailable => Some("Check connectivity to the ledger endpoint and retry."),
            Self::UnknownService => Some("Verify the service id against the directory listing."),
            Self::DirectoryUnavailable => Some("The service directory is unreachable. Retry later."),
            Self::InsufficientFunds => Some("Fund the account shown by 'tollgate address' and retry."),
            Self::SettlementTimeout => Some("The payment is still pending. Retry the same request to resume it."),
            Self::SettlementRejected => Some("The transfer was rejected. Check the account nonce and balance."),
            Self::PaymentTimeout => Some("The payment never confirmed. Inspect the receipt before paying again."),
            Self::ServiceExecutionError => Some("Payment was taken but the service failed. Request a refund out-of-band."),
            Self::BudgetExceeded => Some("Raise the session budget in the configuration."),
            Self::Cancelled => None,
            Self::Configuration => Some("Run 'tollgate init' and review the configuration file."),
            Self::Internal => Some("This is an internal error; please report it."),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building or mutating data model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Amount string is not a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Amounts are never negative.
    #[error("negative amount: {0}")]
    NegativeAmount(String),

    /// More decimal places than the currency supports.
    #[error("precision too high: {given} decimals, {currency} supports {supported}")]
    PrecisionTooHigh {
        given: u32,
        supported: u32,
        currency: String,
    },

    /// Amount does not fit in base units.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Unknown currency code.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// Unknown network name.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// Malformed account address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed service identifier.
    #[error("invalid service id: {0}")]
    InvalidServiceId(String),

    /// Malformed request identifier.
    #[error("invalid request id: {0}")]
    InvalidRequestId(String),

    /// State machine transition that is not allowed.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: RequestState, to: RequestState },

    /// The request has no confirmed receipt yet.
    #[error("request {0} has no confirmed receipt")]
    ReceiptNotConfirmed(String),

    /// Receipt already reached a final status.
    #[error("receipt {transaction_id} is already {status}")]
    ReceiptFinal {
        transaction_id: String,
        status: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_as_str_matches_serde() {
        let json = serde_json::to_string(&ErrorKind::InsufficientFunds).unwrap();
        assert_eq!(json, "\"insufficient_funds\"");
        assert_eq!(ErrorKind::InsufficientFunds.as_str(), "insufficient_funds");
    }

    #[test]
    fn test_suggestions() {
        assert!(ErrorKind::ServiceExecutionError
            .suggestion()
            .unwrap()
            .contains("refund"));
        assert!(ErrorKind::Cancelled.suggestion().is_none());
    }

    #[test]
    fn test_transition_error_display() {
        let err = TypesError::InvalidTransition {
            from: RequestState::Created,
            to: RequestState::Executing,
        };
        assert_eq!(err.to_string(), "invalid transition: CREATED -> EXECUTING");
    }
}
