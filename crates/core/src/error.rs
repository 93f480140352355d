//! Error types for containerdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for containerdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the containerdb store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Key not found in the primary table
    #[error("Key not found: {0:?}")]
    KeyNotFound(String),

    /// Index name not declared
    #[error("Index not found: {0:?}")]
    IndexNotFound(String),

    /// Index name already declared
    #[error("Index already exists: {0:?}")]
    DuplicateIndex(String),

    /// Index name cannot be used (the empty name selects key order)
    #[error("Invalid index name: {0:?}")]
    InvalidIndexName(String),

    /// Mutation attempted inside a read-only transaction
    #[error("Transaction is read-only")]
    ReadOnlyViolation,

    /// `update`/`view` called while a transaction on the same database is active
    #[error("Transaction already in progress")]
    TransactionInProgress,

    /// Operation attempted after the database was closed
    #[error("Database is closed")]
    DatabaseClosed,

    /// Value extractor could not produce a value for a document
    #[error("Extractor failure: {0}")]
    ExtractorFailure(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transaction aborted by the caller
    #[error("Transaction aborted: {0}")]
    Aborted(String),
}

impl Error {
    /// Returns true for the "not found" class (missing key or missing index)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_) | Error::IndexNotFound(_))
    }

    /// Shorthand for `Error::Aborted` with a message
    pub fn aborted(reason: impl Into<String>) -> Self {
        Error::Aborted(reason.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ExtractorFailure(e.to_string())
    }
}
