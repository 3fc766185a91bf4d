//! Error types for the SQLite storage backend
//!
//! `SqliteError` stays inside this crate's engine plumbing. Callers see
//! `StoreError`, with the variant chosen by what the caller was doing when the
//! engine failed (opening, reading, writing or deleting).

use thiserror::Error;

/// Result type for engine-level operations
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors raised by the SQLite engine plumbing
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database connection or query error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// On-disk store is newer than the declared schema version
    #[error("requested version ({requested}) is less than the existing version ({existing})")]
    Version { requested: u32, existing: u32 },

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
