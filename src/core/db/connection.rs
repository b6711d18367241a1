/// Connection Management Module
///
/// Opens the sample database described by a `DatabaseConfig`, applies the
/// configured pragmas, and closes it again. Every example acquires its own
/// `Pool` and releases it before returning.

use crate::config::DatabaseConfig;
use crate::core::db::{Request, Transaction};
use crate::core::{DemoError, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle to the sample database, held for the duration of one operation.
#[derive(Debug)]
pub struct Pool {
    connection: Connection,
    path: PathBuf,
}

impl Pool {
    /// Connects to the database file named in `config`.
    ///
    /// The file is created if it does not exist. Busy timeout, foreign key
    /// enforcement and journal mode are applied before the pool is returned.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::Database` if the file cannot be opened or a pragma
    /// is rejected.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        debug!("Connecting to {}", config.path.display());
        let connection = Connection::open(&config.path)?;

        connection.busy_timeout(config.busy_timeout())?;
        connection.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        let mode: String = connection.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_str(),
            |row| row.get(0),
        )?;
        debug!(journal_mode = %mode, "Connection ready");

        Ok(Pool {
            connection,
            path: config.path.clone(),
        })
    }

    /// Path of the database file behind this pool.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direct access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Starts a new request with no inputs bound.
    pub fn request(&self) -> Request<'_> {
        Request::new(&self.connection)
    }

    /// Begins a transaction. Requests created from it run inside the
    /// transaction until it is committed or rolled back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Transaction::begin(&mut self.connection)
    }

    /// Closes the pool, surfacing any error SQLite reports while finalizing.
    pub fn close(self) -> Result<()> {
        debug!("Closing {}", self.path.display());
        self.connection
            .close()
            .map_err(|(_, e)| DemoError::Database(e))
    }
}

/// Opens a pool, runs `operation` on it, and closes the pool whatever the
/// outcome.
///
/// If the operation succeeds, a failure to close is returned. If the
/// operation already failed, a close failure is logged and the original
/// error is returned.
pub fn with_pool<T, F>(config: &DatabaseConfig, operation: F) -> Result<T>
where
    F: FnOnce(&mut Pool) -> Result<T>,
{
    let mut pool = Pool::connect(config)?;
    let result = operation(&mut pool);

    match (result, pool.close()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "Failed to close pool after a failed operation");
            Err(e)
        }
    }
}
