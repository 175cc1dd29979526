//! Error types for the directory client.

use thiserror::Error;
use tollgate_types::{ErrorKind, ServiceId};

/// Result type alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur while resolving a service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory does not list this service.
    #[error("unknown service: {0}")]
    UnknownService(ServiceId),

    /// The directory could not be reached.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The directory answered with something we cannot use.
    #[error("malformed directory entry for {service_id}: {reason}")]
    Malformed {
        /// Service being resolved
        service_id: ServiceId,
        /// What was wrong with the reply
        reason: String,
    },

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DirectoryError {
    /// Create a new Unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a new Malformed error.
    pub fn malformed(service_id: &ServiceId, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service_id: service_id.clone(),
            reason: reason.into(),
        }
    }

    /// Create a new Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Map onto the gateway error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownService(_) => ErrorKind::UnknownService,
            Self::Unavailable(_) | Self::Malformed { .. } => ErrorKind::DirectoryUnavailable,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let id = ServiceId::new("tavily_search").unwrap();
        assert_eq!(
            DirectoryError::UnknownService(id.clone()).kind(),
            ErrorKind::UnknownService
        );
        assert_eq!(
            DirectoryError::malformed(&id, "missing price").kind(),
            ErrorKind::DirectoryUnavailable
        );
        assert_eq!(
            DirectoryError::unavailable("connection refused").kind(),
            ErrorKind::DirectoryUnavailable
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(DirectoryError::unavailable("503").is_retryable());
        let id = ServiceId::new("x").unwrap();
        assert!(!DirectoryError::UnknownService(id).is_retryable());
    }
}
