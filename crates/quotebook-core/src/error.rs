//! Error types for quotebook-core

use thiserror::Error;

/// Result type alias using quotebook-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quotebook-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected user input, e.g. an empty quote text
    #[error("Validation error: {0}")]
    Validation(String),

    /// Stored snapshot could not be decoded
    #[error("Stored snapshot is corrupt: {0}")]
    PersistenceDecode(String),

    /// Import payload was not a JSON array of quotes
    #[error("Failed to import: {0}")]
    ImportFormat(String),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
