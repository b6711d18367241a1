/// Stored Procedure Module
///
/// SQLite has no stored procedures, so a procedure here is a named,
/// parameterized statement kept in the `__procedures` catalog table together
/// with its declared parameter list. `Request::execute` looks one up and
/// runs it with the request's inputs.

use crate::core::db::{Input, Pool, QueryOutcome, Request, SqlType};
use crate::core::{DemoError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CATALOG_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS __procedures (
    name TEXT PRIMARY KEY COLLATE NOCASE,
    params TEXT NOT NULL,
    body TEXT NOT NULL
)"#;

/// A declared procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParam {
    /// Parameter name without the leading `@`.
    pub name: String,
    pub sql_type: SqlType,
}

impl ProcedureParam {
    pub fn new(name: &str, sql_type: SqlType) -> Self {
        ProcedureParam {
            name: name.trim_start_matches('@').to_string(),
            sql_type,
        }
    }
}

/// A stored procedure definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub params: Vec<ProcedureParam>,
    /// A single statement referencing the parameters as `@name`.
    pub body: String,
}

fn ensure_catalog(conn: &Connection) -> Result<()> {
    conn.execute(CATALOG_TABLE_SQL, [])?;
    Ok(())
}

/// Returns whether a procedure with this name exists.
pub fn procedure_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(find_procedure(conn, name)?.is_some())
}

/// Loads a procedure definition by name.
pub fn find_procedure(conn: &Connection, name: &str) -> Result<Option<Procedure>> {
    ensure_catalog(conn)?;
    let stored = conn
        .query_row(
            "SELECT name, params, body FROM __procedures WHERE name = ?1",
            [name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    match stored {
        Some((name, params, body)) => Ok(Some(Procedure {
            name,
            params: serde_json::from_str(&params)?,
            body,
        })),
        None => Ok(None),
    }
}

/// Drops the procedure if it exists. Returns whether one was dropped.
pub fn drop_procedure_if_exists(conn: &Connection, name: &str) -> Result<bool> {
    ensure_catalog(conn)?;
    let dropped = conn.execute("DELETE FROM __procedures WHERE name = ?1", [name])? > 0;
    if dropped {
        info!(procedure = name, "Dropped procedure");
    }
    Ok(dropped)
}

/// Creates a procedure.
///
/// The body must be one statement that compiles against the current schema
/// and whose placeholders are all declared parameters.
///
/// # Errors
///
/// Returns `DemoError::Procedure` if the name is taken, the body does not
/// prepare, or it references an undeclared parameter.
pub fn create_procedure(conn: &Connection, procedure: &Procedure) -> Result<()> {
    ensure_catalog(conn)?;
    if procedure_exists(conn, &procedure.name)? {
        return Err(DemoError::Procedure(format!(
            "there is already an object named '{}' in the database",
            procedure.name
        )));
    }

    {
        let stmt = conn.prepare(&procedure.body).map_err(|e| {
            DemoError::Procedure(format!("invalid body for '{}': {}", procedure.name, e))
        })?;
        for index in 1..=stmt.parameter_count() {
            let placeholder = stmt.parameter_name(index).unwrap_or("?");
            let declared = procedure.params.iter().any(|p| {
                p.name
                    .eq_ignore_ascii_case(placeholder.trim_start_matches(|c: char| matches!(c, '@' | ':' | '$')))
            });
            if !declared {
                return Err(DemoError::Procedure(format!(
                    "'{}' references undeclared parameter {}",
                    procedure.name, placeholder
                )));
            }
        }
    }

    let params = serde_json::to_string(&procedure.params)?;
    conn.execute(
        "INSERT INTO __procedures (name, params, body) VALUES (?1, ?2, ?3)",
        (&procedure.name, &params, &procedure.body),
    )?;
    info!(procedure = %procedure.name, "Created procedure");
    Ok(())
}

impl Pool {
    pub fn create_procedure(&self, procedure: &Procedure) -> Result<()> {
        create_procedure(self.connection(), procedure)
    }

    pub fn drop_procedure_if_exists(&self, name: &str) -> Result<bool> {
        drop_procedure_if_exists(self.connection(), name)
    }
}

impl<'c> Request<'c> {
    /// Executes the named stored procedure with this request's inputs.
    ///
    /// Every declared parameter must be supplied; each input is checked
    /// against the type the procedure declares for it.
    pub fn execute(&self, procedure_name: &str) -> Result<QueryOutcome> {
        let procedure = find_procedure(self.connection(), procedure_name)?.ok_or_else(|| {
            DemoError::Procedure(format!(
                "could not find stored procedure '{}'",
                procedure_name
            ))
        })?;
        debug!(procedure = %procedure.name, "Executing procedure");

        let mut call = Request::new(self.connection());
        for param in &procedure.params {
            let Input { value, .. } = self.find_input(&param.name).ok_or_else(|| {
                DemoError::Bind(format!(
                    "procedure '{}' expects parameter @{}, which was not supplied",
                    procedure.name, param.name
                ))
            })?;
            param.sql_type.check(&param.name, value)?;
            call = call.input(&param.name, param.sql_type, value.clone());
        }

        call.query(&procedure.body)
    }
}
