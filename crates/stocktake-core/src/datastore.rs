//! The datastore seam
//!
//! The engine never talks HTTP itself. It reads and writes through a
//! [`Datastore`], which the Airtable adapter implements for production and
//! test fakes implement in memory.

use async_trait::async_trait;

use crate::record::{NewRow, RowUpdate, StoredRow};

/// Maximum rows per write call in the reference (Airtable) integration
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Result type for datastore calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by a datastore implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// The datastore refused the request because of rate limiting
    #[error("rate limited by the datastore")]
    RateLimited,

    /// The datastore answered with an error status
    #[error("datastore rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not what we expected
    #[error("unexpected response: {0}")]
    Decode(String),

    /// A write call carried more rows than the datastore accepts
    #[error("batch of {size} rows exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },
}

impl StoreError {
    /// Whether the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout)
    }
}

/// A tabular datastore reached over the network.
///
/// Batch calls succeed or fail as a whole; there is no per-row outcome.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Largest number of rows a single write call may carry
    fn max_batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }

    /// Every row of `table` visible in `view`, across all pages
    async fn select_all(&self, table: &str, view: &str) -> StoreResult<Vec<StoredRow>>;

    /// Create up to [`max_batch_size`](Self::max_batch_size) rows
    async fn create_batch(&self, table: &str, rows: &[NewRow]) -> StoreResult<()>;

    /// Update up to [`max_batch_size`](Self::max_batch_size) rows
    async fn update_batch(&self, table: &str, updates: &[RowUpdate]) -> StoreResult<()>;
}
