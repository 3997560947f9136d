//! Error types for presence storage
//!
//! Two families: `ValidationError` for input that must be rejected before
//! any store access, and `StoreError` for failures inside a backend.

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised by a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown store backend '{0}', expected 'sqlite' or 'memory'")]
    UnknownBackend(String),
}

/// Rejected record input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing name")]
    MissingName,

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Missing lineStatus")]
    MissingStatus,

    #[error("Invalid lineStatus '{0}', expected 'online' or 'offline'")]
    InvalidStatus(String),
}
