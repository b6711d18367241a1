//! Typed rows for the two sample tables.

use crate::core::db::{Row, Value};
use crate::core::{DemoError, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Storage format of SQLite's `CURRENT_TIMESTAMP`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row of the `info` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoRecord {
    pub id: i64,
    pub name: String,
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub created_date: NaiveDateTime,
}

fn missing(table: &str, column: &str) -> DemoError {
    DemoError::Query(format!("{} row has no usable '{}' column", table, column))
}

impl TryFrom<&Row> for InfoRecord {
    type Error = DemoError;

    fn try_from(row: &Row) -> Result<Self> {
        Ok(InfoRecord {
            id: row.get_i64("id").ok_or_else(|| missing("info", "id"))?,
            name: row
                .get_str("name")
                .ok_or_else(|| missing("info", "name"))?
                .to_string(),
        })
    }
}

impl TryFrom<&Row> for UserRecord {
    type Error = DemoError;

    fn try_from(row: &Row) -> Result<Self> {
        let email = match row.get("email") {
            Some(Value::Text(email)) => Some(email.clone()),
            Some(Value::Null) => None,
            _ => return Err(missing("users", "email")),
        };
        let created_date = row
            .get_str("created_date")
            .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
            .ok_or_else(|| missing("users", "created_date"))?;

        Ok(UserRecord {
            id: row.get_i64("id").ok_or_else(|| missing("users", "id"))?,
            name: row
                .get_str("name")
                .ok_or_else(|| missing("users", "name"))?
                .to_string(),
            email,
            created_date,
        })
    }
}
