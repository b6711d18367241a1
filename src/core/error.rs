/// Error Module
///
/// This module defines the error type shared by every sqldemo operation.
/// Database, binding, configuration and procedure failures all surface
/// through `DemoError` so the example runner can report them uniformly.
use thiserror::Error;

/// Error type for the sqldemo crate.
///
/// Covers:
/// - Database operations (connection, statements, close)
/// - Parameter binding against declared types
/// - Configuration loading
/// - Transactions and stored procedures
/// - File system and JSON handling
#[derive(Error, Debug)]
pub enum DemoError {
    /// Errors raised by SQLite itself
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Statement preparation and execution errors
    #[error("Query error: {0}")]
    Query(String),

    /// A parameter is missing or does not satisfy its declared type
    #[error("Bind error: {0}")]
    Bind(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transaction-related errors
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Stored procedure lookup and definition errors
    #[error("Procedure error: {0}")]
    Procedure(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding and decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias using `DemoError` as the error type.
pub type Result<T> = std::result::Result<T, DemoError>;
