//! Error types for stocktake-cli

use stocktake_core::StoreError;
use stocktake_providers::ProviderError;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from stocktake-core
    #[error(transparent)]
    Core(#[from] stocktake_core::Error),

    /// Error from a provider fetch
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Error from the datastore client
    #[error("Airtable: {0}")]
    Store(#[from] StoreError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
