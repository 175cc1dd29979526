//! Error types for the gateway.

use serde::Serialize;
use thiserror::Error;
use tollgate_directory::DirectoryError;
use tollgate_settle::SettleError;
use tollgate_types::{
    Amount, Currency, ErrorKind, PaymentReceipt, RequestId, RequestState, ServiceId,
    StateTransition,
};

use crate::executor::ExecutionError;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Where a request was when it failed.
#[derive(Debug, Clone, Serialize)]
pub struct FailureContext {
    /// Requested service
    pub service_id: ServiceId,
    /// Logical request id (the payment idempotency key)
    pub request_id: RequestId,
    /// State the request was in when the failure happened
    pub state: RequestState,
    /// Last known receipt, if payment was attempted
    pub receipt: Option<PaymentReceipt>,
    /// Every transition, ending in `FAILED`
    pub trace: Vec<StateTransition>,
}

/// Errors returned by the orchestrator.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service identifier is malformed.
    #[error("invalid service id: {0}")]
    InvalidServiceId(String),

    /// Directory lookup failed.
    #[error("directory lookup failed: {source}")]
    Directory {
        /// Underlying directory error
        source: DirectoryError,
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// Payment failed.
    #[error("payment failed: {source}")]
    Settlement {
        /// Underlying settlement error
        source: SettleError,
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// Payment stayed pending through every retry.
    #[error("payment not confirmed after {attempts} attempts")]
    PaymentTimeout {
        /// Number of `pay` calls made
        attempts: u32,
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// The paid service failed. The payment is not refunded.
    #[error("service execution failed: {source}")]
    Execution {
        /// Underlying executor error
        source: ExecutionError,
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// The price exceeds what is left of the session budget.
    #[error("budget exceeded: price {price} {currency}, remaining {remaining} {currency}")]
    BudgetExceeded {
        /// Quoted price
        price: Amount,
        /// Remaining budget
        remaining: Amount,
        /// Budget currency
        currency: Currency,
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// The caller cancelled the invocation.
    #[error("invocation cancelled")]
    Cancelled {
        /// Request state at failure
        context: Box<FailureContext>,
    },

    /// Unexpected internal state.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create a new Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Map onto the gateway error taxonomy, preserving the originating kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidServiceId(_) => ErrorKind::UnknownService,
            Self::Directory { source, .. } => source.kind(),
            Self::Settlement { source, .. } => source.kind(),
            Self::PaymentTimeout { .. } => ErrorKind::PaymentTimeout,
            Self::Execution { .. } => ErrorKind::ServiceExecutionError,
            Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Directory { source, .. } => source.is_retryable(),
            Self::Settlement { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Request state at failure, when the request got that far.
    pub fn context(&self) -> Option<&FailureContext> {
        match self {
            Self::Directory { context, .. }
            | Self::Settlement { context, .. }
            | Self::PaymentTimeout { context, .. }
            | Self::Execution { context, .. }
            | Self::BudgetExceeded { context, .. }
            | Self::Cancelled { context } => Some(context),
            Self::InvalidServiceId(_) | Self::Internal(_) => None,
        }
    }

    /// Last known receipt of the failed request.
    pub fn receipt(&self) -> Option<&PaymentReceipt> {
        self.context().and_then(|c| c.receipt.as_ref())
    }

    /// Get a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        self.kind().suggestion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Box<FailureContext> {
        Box::new(FailureContext {
            service_id: ServiceId::new("tavily_search").unwrap(),
            request_id: RequestId::new(),
            state: RequestState::DirectoryResolved,
            receipt: None,
            trace: Vec::new(),
        })
    }

    #[test]
    fn test_kind_preserved_through_wrapping() {
        let err = GatewayError::Settlement {
            source: SettleError::insufficient_funds(
                Amount::ZERO,
                Amount::parse("0.01").unwrap(),
                Currency::Usdc,
            ),
            context: context(),
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert!(!err.is_retryable());

        let err = GatewayError::Directory {
            source: DirectoryError::unavailable("503"),
            context: context(),
        };
        assert_eq!(err.kind(), ErrorKind::DirectoryUnavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_context_and_suggestion() {
        let err = GatewayError::Cancelled { context: context() };
        assert_eq!(
            err.context().unwrap().state,
            RequestState::DirectoryResolved
        );
        assert!(err.receipt().is_none());
        assert!(GatewayError::internal("x").context().is_none());
        assert!(GatewayError::PaymentTimeout {
            attempts: 3,
            context: context()
        }
        .suggestion()
        .is_some());
    }
}
