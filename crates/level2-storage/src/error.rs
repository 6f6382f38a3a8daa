//! Error types for the storage clients.

use thiserror::Error;

/// Errors from archive/realtime object-storage access.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("failed to configure object store: {0}")]
    Configuration(String),

    #[error("malformed object key: {0}")]
    MalformedKey(String),

    #[error("no volumes found for site {0}")]
    NoVolumes(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
