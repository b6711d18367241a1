/// Transaction Module
///
/// Wraps a SQLite transaction so that requests can be issued inside it and
/// the whole group committed or rolled back. Dropping an unfinished
/// transaction rolls it back.

use crate::core::db::Request;
use crate::core::{DemoError, Result};
use rusqlite::Connection;
use tracing::debug;

/// How a transaction ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Committed,
    RolledBack,
}

/// An open transaction on a pool's connection.
#[derive(Debug)]
pub struct Transaction<'p> {
    inner: rusqlite::Transaction<'p>,
}

impl<'p> Transaction<'p> {
    pub(crate) fn begin(connection: &'p mut Connection) -> Result<Self> {
        let inner = connection
            .transaction()
            .map_err(|e| DemoError::Transaction(format!("Failed to begin transaction: {}", e)))?;
        debug!("Transaction started");
        Ok(Transaction { inner })
    }

    /// Starts a request that runs inside this transaction.
    pub fn request(&self) -> Request<'_> {
        Request::new(&self.inner)
    }

    /// Commits every request issued through this transaction.
    pub fn commit(self) -> Result<TransactionState> {
        self.inner
            .commit()
            .map_err(|e| DemoError::Transaction(format!("Failed to commit transaction: {}", e)))?;
        debug!("Transaction committed");
        Ok(TransactionState::Committed)
    }

    /// Discards every request issued through this transaction.
    pub fn rollback(self) -> Result<TransactionState> {
        self.inner
            .rollback()
            .map_err(|e| DemoError::Transaction(format!("Failed to roll back transaction: {}", e)))?;
        debug!("Transaction rolled back");
        Ok(TransactionState::RolledBack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::SqlType;

    fn test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_commit_persists_requests() {
        let mut conn = test_connection();
        {
            let tx = Transaction::begin(&mut conn).unwrap();
            tx.request()
                .input("name", SqlType::VarChar(50), "first")
                .query("INSERT INTO items (name) VALUES (@name)")
                .unwrap();
            assert_eq!(tx.commit().unwrap(), TransactionState::Committed);
        }
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_rollback_discards_requests() {
        let mut conn = test_connection();
        {
            let tx = Transaction::begin(&mut conn).unwrap();
            tx.request()
                .input("name", SqlType::VarChar(50), "first")
                .query("INSERT INTO items (name) VALUES (@name)")
                .unwrap();
            assert_eq!(tx.rollback().unwrap(), TransactionState::RolledBack);
        }
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn test_drop_without_commit_rolls_back() {
        let mut conn = test_connection();
        {
            let tx = Transaction::begin(&mut conn).unwrap();
            tx.request()
                .input("name", SqlType::VarChar(50), "orphan")
                .query("INSERT INTO items (name) VALUES (@name)")
                .unwrap();
        }
        assert_eq!(count(&conn), 0);
    }
}
