//! Storage error types

use thiserror::Error;

/// Errors that can occur during storage and bulk transfer operations
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The embedded store could not be opened
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// No record with this key exists in the collection
    #[error("{collection} record not found: {key}")]
    NotFound { collection: String, key: String },

    /// Engine error while reading
    #[error("read failed: {0}")]
    ReadFailed(String),

    /// Engine error while writing
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Engine error while deleting
    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// Import input is not a well-formed bundle
    #[error("invalid bundle format: {0}")]
    InvalidBundleFormat(String),

    /// A record write failed part-way through a bulk import
    #[error("import failed: {0}")]
    ImportFailed(Box<StoreError>),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(collection: &str, key: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
