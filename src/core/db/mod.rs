/// Database Module
///
/// This module provides the database layer every example is built on,
/// organized into focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): opens and closes the per-operation pool
/// - **Requests** (`request.rs`): named, typed parameter binding and statement execution
/// - **Recordsets** (`recordset.rs`): values, rows and recordsets returned by queries
/// - **Transactions** (`transaction.rs`): begin/commit/rollback around grouped requests
/// - **Procedures** (`procedure.rs`): named parameterized statements stored in the database
///
/// ## Error Handling
///
/// All database operations return the crate-wide `DemoError`.
pub mod connection;
pub mod procedure;
pub mod recordset;
pub mod request;
pub mod transaction;

pub use connection::*;
pub use procedure::*;
pub use recordset::*;
pub use request::*;
pub use transaction::*;
