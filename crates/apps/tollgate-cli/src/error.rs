//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;
use tollgate_types::ErrorKind;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error enum wrapping all crate errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Account error.
    #[error("{0}")]
    Account(#[from] tollgate_account::AccountError),

    /// Directory error.
    #[error("{0}")]
    Directory(#[from] tollgate_directory::DirectoryError),

    /// Settlement error.
    #[error("{0}")]
    Settlement(#[from] tollgate_settle::SettleError),

    /// Invocation error.
    #[error("{0}")]
    Gateway(#[from] tollgate_gateway::GatewayError),

    /// Data model error.
    #[error("{0}")]
    Types(#[from] tollgate_types::TypesError),

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// User-facing error with actionable message.
    #[error("{0}")]
    User(String),

    /// Config file already exists.
    #[error("Configuration already exists at {}. Use --force to overwrite.", .0.display())]
    ConfigExists(PathBuf),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user-facing error.
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Failure kind, taken from the originating crate where there is one.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Account(e) => e.kind(),
            Self::Directory(e) => e.kind(),
            Self::Settlement(e) => e.kind(),
            Self::Gateway(e) => e.kind(),
            Self::Config(_) | Self::Toml(_) | Self::ConfigExists(_) | Self::User(_) => {
                ErrorKind::Configuration
            }
            Self::Types(_) | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if matches!(self, Self::User(_) | Self::ConfigExists(_)) {
            return 1;
        }
        match self.kind() {
            ErrorKind::UnknownService => 2,
            ErrorKind::Configuration => 3,
            ErrorKind::InsufficientFunds | ErrorKind::BudgetExceeded => 4,
            ErrorKind::NetworkUnavailable | ErrorKind::DirectoryUnavailable => 5,
            ErrorKind::SettlementTimeout
            | ErrorKind::SettlementRejected
            | ErrorKind::PaymentTimeout => 7,
            ErrorKind::ServiceExecutionError => 8,
            ErrorKind::Cancelled => 130,
            _ => 10,
        }
    }

    /// Recovery hint for this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ConfigExists(_) => None,
            Self::User(_) => None,
            _ => self.kind().suggestion(),
        }
    }
}
