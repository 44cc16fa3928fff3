//! Error types for stocktake-core

use std::path::PathBuf;

use crate::datastore::StoreError;
use crate::reconcile::WriteOperation;

/// Result type for stocktake-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in stocktake-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No configuration file at the expected location
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Configuration parsed but a value is unusable
    #[error("Invalid configuration: `{field}` must not be empty")]
    ConfigInvalid { field: String },

    /// Configuration file has an extension we cannot read
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// One or more required credentials are absent from the environment
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnv { names: Vec<String> },

    /// The same name appears twice in one reconciliation target
    #[error("Duplicate {record_type} record named '{name}'")]
    DuplicateRecord { record_type: String, name: String },

    /// A target record does not belong to the type being reconciled
    #[error("Record '{name}' has type '{found}' but '{expected}' is being reconciled")]
    TypeMismatch {
        expected: String,
        found: String,
        name: String,
    },

    /// Kind-specific fields did not serialize to a JSON object
    #[error("Fields for {record_type} records must serialize to an object")]
    InvalidFields { record_type: String },

    /// Reading the current rows failed
    #[error("Failed to read rows from {table}: {source}")]
    Fetch {
        table: String,
        #[source]
        source: StoreError,
    },

    /// A batch write failed; earlier batches remain committed
    #[error("Failed to {operation} {record_type} rows in {table}: {source}")]
    Write {
        operation: WriteOperation,
        record_type: String,
        table: String,
        #[source]
        source: StoreError,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error was caused by a datastore request timing out
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Fetch { source, .. } | Error::Write { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
