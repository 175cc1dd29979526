//! Error types for the account module.

use thiserror::Error;
use tollgate_types::{ErrorKind, TypesError};

/// Result type alias for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Errors that can occur while managing an account.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The ledger could not be queried.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Credential source missing or unreadable.
    #[error("credential error: {0}")]
    Credential(String),

    /// Key bytes are not a valid Ed25519 seed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Ledger returned a value we cannot interpret.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),

    /// Data model error.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccountError {
    /// Create a new NetworkUnavailable error.
    pub fn network_unavailable(msg: impl Into<String>) -> Self {
        Self::NetworkUnavailable(msg.into())
    }

    /// Create a new Credential error.
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }

    /// Create a new InvalidResponse error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkUnavailable(_))
    }

    /// Map onto the gateway error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkUnavailable(_) | Self::InvalidResponse(_) => ErrorKind::NetworkUnavailable,
            Self::Credential(_) | Self::InvalidKey(_) | Self::Io(_) => ErrorKind::Configuration,
            Self::Types(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AccountError::network_unavailable("refused").kind(),
            ErrorKind::NetworkUnavailable
        );
        assert_eq!(
            AccountError::credential("TOLLGATE_PRIVATE_KEY not set").kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(AccountError::network_unavailable("timeout").is_retryable());
        assert!(!AccountError::InvalidKey("short".into()).is_retryable());
    }
}
