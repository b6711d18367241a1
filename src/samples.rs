/// Sample Queries Module
///
/// The example operations against the `info` and `users` tables. Each one
/// opens its own pool, runs its statements, and closes the pool before
/// returning. They return data rather than printing it; `runner` handles
/// console output and error reporting.

use crate::config::DatabaseConfig;
use crate::core::db::{with_pool, Procedure, ProcedureParam, Recordset, SqlType, TransactionState};
use crate::core::{DemoError, Result};
use crate::models::InfoRecord;
use tracing::info;

/// Name of the procedure created by the stored procedure example.
pub const PROCEDURE_NAME: &str = "GetInfoByName";

/// Names inserted by the transaction example.
pub const TRANSACTION_NAMES: [&str; 2] = ["Transaction User 1", "Transaction User 2"];

/// Result of the transaction example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Committed,
    /// The inner block failed and was rolled back; carries the failure.
    RolledBack(String),
}

/// First `limit` rows of `info`.
pub fn first_records(config: &DatabaseConfig, limit: u32) -> Result<Recordset> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("limit", SqlType::BigInt, i64::from(limit))
            .query("SELECT * FROM info ORDER BY id LIMIT @limit")?;
        Ok(outcome.recordset)
    })
}

/// Example 1: every row of `info`.
pub fn get_all_records(config: &DatabaseConfig) -> Result<Recordset> {
    with_pool(config, |pool| {
        Ok(pool.request().query("SELECT * FROM info")?.recordset)
    })
}

/// Example 2: one row of `info` by id, if present.
pub fn get_record_by_id(config: &DatabaseConfig, id: i64) -> Result<Option<InfoRecord>> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("id", SqlType::Int, id)
            .query("SELECT * FROM info WHERE id = @id")?;
        outcome.recordset.first().map(InfoRecord::try_from).transpose()
    })
}

/// Example 3: inserts a row and returns its new id.
pub fn insert_record(config: &DatabaseConfig, name: &str) -> Result<i64> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("name", SqlType::VarChar(50), name)
            .query("INSERT INTO info (name) VALUES (@name) RETURNING id")?;
        let id = outcome
            .scalar_i64("id")
            .ok_or_else(|| DemoError::Query("insert did not return an id".to_string()))?;
        info!(id, "Inserted record");
        Ok(id)
    })
}

/// Example 4: renames a row. Returns the affected-row count; zero means no
/// row has that id.
pub fn update_record(config: &DatabaseConfig, id: i64, name: &str) -> Result<usize> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("id", SqlType::Int, id)
            .input("name", SqlType::VarChar(50), name)
            .query("UPDATE info SET name = @name WHERE id = @id")?;
        Ok(outcome.rows_affected)
    })
}

/// Example 5: deletes a row. Returns the affected-row count.
pub fn delete_record(config: &DatabaseConfig, id: i64) -> Result<usize> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("id", SqlType::Int, id)
            .query("DELETE FROM info WHERE id = @id")?;
        Ok(outcome.rows_affected)
    })
}

/// Example 6: rows whose name contains `term`.
///
/// Matching uses SQL `LIKE`, so `%` and `_` in `term` act as wildcards and
/// case handling follows SQLite (ASCII letters match case-insensitively).
pub fn search_by_name(config: &DatabaseConfig, term: &str) -> Result<Recordset> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .input("searchTerm", SqlType::VarChar(50), format!("%{}%", term))
            .query("SELECT * FROM info WHERE name LIKE @searchTerm")?;
        Ok(outcome.recordset)
    })
}

/// Example 7: number of rows in `info`.
pub fn count_records(config: &DatabaseConfig) -> Result<i64> {
    with_pool(config, |pool| {
        let outcome = pool
            .request()
            .query("SELECT COUNT(*) AS total FROM info")?;
        Ok(outcome.scalar_i64("total").unwrap_or(0))
    })
}

/// Example 8: inserts two rows atomically.
///
/// A failure in either insert rolls both back and is reported as
/// `TransactionOutcome::RolledBack`; failures outside the transaction
/// (connecting, beginning) are returned as errors.
pub fn transaction_example(
    config: &DatabaseConfig,
    first: &str,
    second: &str,
) -> Result<TransactionOutcome> {
    with_pool(config, |pool| {
        let tx = pool.transaction()?;

        let inserted = [first, second].iter().try_for_each(|name| {
            tx.request()
                .input("name", SqlType::VarChar(50), *name)
                .query("INSERT INTO info (name) VALUES (@name)")
                .map(|_| ())
        });

        match inserted {
            Ok(()) => {
                tx.commit()?;
                Ok(TransactionOutcome::Committed)
            }
            Err(e) => {
                info!(error = %e, "Rolling back transaction");
                match tx.rollback()? {
                    TransactionState::RolledBack => Ok(TransactionOutcome::RolledBack(e.to_string())),
                    TransactionState::Committed => Err(DemoError::Transaction(
                        "rollback reported a committed transaction".to_string(),
                    )),
                }
            }
        }
    })
}

/// Example 9: first five rows of `info` joined to `users` on id, keeping
/// unmatched rows from both sides.
pub fn join_example(config: &DatabaseConfig) -> Result<Recordset> {
    with_pool(config, |pool| {
        let outcome = pool.request().query(
            "
            SELECT
                i.id,
                i.name AS info_name,
                u.name AS user_name,
                u.email
            FROM info i
            FULL OUTER JOIN users u ON i.id = u.id
            ORDER BY COALESCE(i.id, u.id)
            LIMIT 5
            ",
        )?;
        Ok(outcome.recordset)
    })
}

/// Example 10: (re)creates the `GetInfoByName` procedure and runs it.
pub fn stored_procedure_example(config: &DatabaseConfig, name: &str) -> Result<Recordset> {
    with_pool(config, |pool| {
        pool.drop_procedure_if_exists(PROCEDURE_NAME)?;
        pool.create_procedure(&Procedure {
            name: PROCEDURE_NAME.to_string(),
            params: vec![ProcedureParam::new("name", SqlType::VarChar(50))],
            body: "SELECT * FROM info WHERE name LIKE '%' || @name || '%'".to_string(),
        })?;

        let outcome = pool
            .request()
            .input("name", SqlType::VarChar(50), name)
            .execute(PROCEDURE_NAME)?;
        Ok(outcome.recordset)
    })
}
