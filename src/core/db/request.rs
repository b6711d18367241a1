/// Request Module
///
/// A `Request` collects named inputs, each with a declared SQL type, and
/// runs one statement with them bound to its `@name` placeholders.
///
/// ```ignore
/// let outcome = pool
///     .request()
///     .input("id", SqlType::Int, 1)
///     .query("SELECT * FROM info WHERE id = @id")?;
/// ```

use crate::core::db::{Recordset, Row, Value};
use crate::core::{DemoError, Result};
use chrono::NaiveDateTime;
use rusqlite::{Batch, Connection, Statement};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Formats accepted for `SqlType::DateTime` inputs.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Declared type of a bound input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// Text of at most the given number of characters.
    VarChar(usize),
    /// Unicode text of at most the given number of characters.
    NVarChar(usize),
    /// Unbounded text.
    Text,
    Float,
    /// Text timestamp, `YYYY-MM-DD HH:MM:SS`.
    DateTime,
}

impl SqlType {
    /// Checks that `value` is acceptable for this declared type.
    ///
    /// NULL is accepted for every type.
    pub fn check(&self, name: &str, value: &Value) -> Result<()> {
        let ok = match (self, value) {
            (_, Value::Null) => true,
            (SqlType::Int, Value::Integer(i)) => i32::try_from(*i).is_ok(),
            (SqlType::BigInt, Value::Integer(_)) => true,
            (SqlType::VarChar(max) | SqlType::NVarChar(max), Value::Text(t)) => {
                let len = t.chars().count();
                if len > *max {
                    return Err(DemoError::Bind(format!(
                        "value for @{} is {} characters long, {} allows at most {}",
                        name, len, self, max
                    )));
                }
                true
            }
            (SqlType::Text, Value::Text(_)) => true,
            (SqlType::Float, Value::Real(_) | Value::Integer(_)) => true,
            (SqlType::DateTime, Value::Text(t)) => DATETIME_FORMATS
                .iter()
                .any(|pattern| NaiveDateTime::parse_from_str(t, pattern).is_ok()),
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(DemoError::Bind(format!(
                "{} value '{}' is not valid for @{} declared as {}",
                value.kind(),
                value,
                name,
                self
            )))
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Int => write!(f, "INT"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::VarChar(n) => write!(f, "VARCHAR({})", n),
            SqlType::NVarChar(n) => write!(f, "NVARCHAR({})", n),
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::DateTime => write!(f, "DATETIME"),
        }
    }
}

/// A named input with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub name: String,
    pub sql_type: SqlType,
    pub value: Value,
}

/// Rows and affected-row count produced by one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub recordset: Recordset,
    /// Rows changed by an INSERT, UPDATE or DELETE; zero otherwise.
    pub rows_affected: usize,
}

impl QueryOutcome {
    /// Integer value of `column` in the first row, if any.
    pub fn scalar_i64(&self, column: &str) -> Option<i64> {
        self.recordset.first().and_then(|row| row.get_i64(column))
    }
}

/// A statement execution request bound to a connection.
#[derive(Debug, Clone)]
pub struct Request<'c> {
    connection: &'c Connection,
    inputs: Vec<Input>,
}

impl<'c> Request<'c> {
    pub(crate) fn new(connection: &'c Connection) -> Self {
        Request {
            connection,
            inputs: Vec::new(),
        }
    }

    pub(crate) fn connection(&self) -> &'c Connection {
        self.connection
    }

    /// Adds a named input. A later input with the same name replaces the
    /// earlier one. The leading `@` is optional.
    pub fn input<V: Into<Value>>(mut self, name: &str, sql_type: SqlType, value: V) -> Self {
        let name = strip_prefix(name).to_string();
        self.inputs.retain(|i| !i.name.eq_ignore_ascii_case(&name));
        self.inputs.push(Input {
            name,
            sql_type,
            value: value.into(),
        });
        self
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub(crate) fn find_input(&self, name: &str) -> Option<&Input> {
        let name = strip_prefix(name);
        self.inputs.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Executes `sql` with this request's inputs bound.
    ///
    /// `sql` must hold exactly one statement. Only inputs the statement
    /// references are bound and checked against their declared type.
    ///
    /// # Errors
    ///
    /// - `DemoError::Bind` if a bound input violates its declared type or a
    ///   placeholder has no matching input
    /// - `DemoError::Query` if the statement cannot be prepared, fails, or
    ///   is followed by further statements
    pub fn query(&self, sql: &str) -> Result<QueryOutcome> {
        debug!(sql = sql.trim(), inputs = self.inputs.len(), "Executing statement");

        let mut stmt = self.prepare_single(sql)?;
        self.bind(&mut stmt)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let changes_before = if stmt.readonly() {
            None
        } else {
            Some(total_changes(self.connection)?)
        };

        let recordset = if columns.is_empty() {
            stmt.raw_execute()
                .map_err(|e| DemoError::Query(format!("Statement execution failed: {}", e)))?;
            Recordset::default()
        } else {
            collect_rows(&mut stmt, columns)?
        };

        // DDL leaves `changes()` holding the previous statement's count, so it
        // is only trusted when the running total moved.
        let rows_affected = match changes_before {
            Some(before) if total_changes(self.connection)? > before => {
                self.connection.changes() as usize
            }
            _ => 0,
        };
        debug!(rows = recordset.len(), rows_affected, "Statement complete");

        Ok(QueryOutcome {
            recordset,
            rows_affected,
        })
    }

    fn prepare_single(&self, sql: &str) -> Result<Statement<'c>> {
        let mut batch = Batch::new(self.connection, sql);
        let stmt = batch
            .next()
            .map_err(|e| DemoError::Query(format!("Failed to prepare statement: {}", e)))?
            .ok_or_else(|| DemoError::Query("no statement to execute".to_string()))?;

        match batch.next() {
            Ok(None) => Ok(stmt),
            Ok(Some(_)) | Err(_) => Err(DemoError::Query(
                "only one statement per request is supported".to_string(),
            )),
        }
    }

    fn bind(&self, stmt: &mut Statement<'_>) -> Result<()> {
        for index in 1..=stmt.parameter_count() {
            let name = stmt.parameter_name(index).map(str::to_owned).ok_or_else(|| {
                DemoError::Bind(format!(
                    "positional parameter {} is not supported, use @name placeholders",
                    index
                ))
            })?;
            let input = self.find_input(&name).ok_or_else(|| {
                DemoError::Bind(format!("must declare the scalar variable {}", name))
            })?;
            input.sql_type.check(&input.name, &input.value)?;
            stmt.raw_bind_parameter(index, &input.value)?;
        }
        Ok(())
    }
}

fn total_changes(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT total_changes()", [], |row| row.get(0))?)
}

fn collect_rows(stmt: &mut Statement<'_>, columns: Vec<String>) -> Result<Recordset> {
    let shared: Arc<[String]> = columns.clone().into();
    let column_count = columns.len();
    let mut rows = stmt.raw_query();
    let mut collected = Vec::new();

    while let Some(row) = rows
        .next()
        .map_err(|e| DemoError::Query(format!("Query execution failed: {}", e)))?
    {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(Value::from_ref(row.get_ref(i)?));
        }
        collected.push(Row::new(Arc::clone(&shared), values));
    }

    Ok(Recordset::new(columns, collected))
}

fn strip_prefix(name: &str) -> &str {
    name.trim_start_matches(|c: char| matches!(c, '@' | ':' | '$'))
}
