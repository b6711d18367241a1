/// Core Module for sqldemo
///
/// Shared infrastructure used by every example: the error type and the
/// database layer (connection pool, parameterized requests, recordsets,
/// transactions and stored procedures).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DemoError, Result};
