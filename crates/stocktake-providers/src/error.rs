//! Error types for stocktake-providers

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors raised while fetching a provider's inventory
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider did not answer in time
    #[error("{provider} request to {url} timed out")]
    Timeout { provider: &'static str, url: String },

    /// The request never got a response
    #[error("{provider} request to {url} failed: {message}")]
    Http {
        provider: &'static str,
        url: String,
        message: String,
    },

    /// The provider answered with an error status
    #[error("{provider} returned {status} for {url}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        url: String,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode {provider} response from {url}: {message}")]
    Decode {
        provider: &'static str,
        url: String,
        message: String,
    },

    /// An AWS SDK call failed
    #[error("AWS {operation} failed: {message}")]
    Aws {
        operation: &'static str,
        message: String,
    },

    /// Normalized records could not be grouped for merging
    #[error(transparent)]
    Record(#[from] stocktake_core::Error),
}

impl ProviderError {
    /// Whether the failure was a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}
