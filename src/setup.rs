//! Database setup: drops and recreates the `info` and `users` tables, seeds
//! them with fixed sample rows, and verifies the result.

use crate::config::DatabaseConfig;
use crate::core::db::{with_pool, Pool, Recordset, SqlType};
use crate::core::Result;
use crate::models::UserRecord;
use tracing::info;

pub const INFO_SEED: [&str; 10] = [
    "John Doe",
    "Jane Smith",
    "Mike Johnson",
    "Sarah Williams",
    "Robert Brown",
    "Emily Davis",
    "Michael Wilson",
    "Jessica Martinez",
    "David Anderson",
    "Jennifer Taylor",
];

pub const USERS_SEED: [(&str, &str); 5] = [
    ("Alice Johnson", "alice.j@example.com"),
    ("Bob Smith", "bob.smith@example.com"),
    ("Charlie Brown", "charlie.b@example.com"),
    ("Diana Prince", "diana.p@example.com"),
    ("Edward Norton", "edward.n@example.com"),
];

const CREATE_INFO_SQL: &str = r#"
CREATE TABLE info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(50) NOT NULL CHECK (length(name) <= 50)
)"#;

const CREATE_USERS_SQL: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(50) NOT NULL CHECK (length(name) <= 50),
    email VARCHAR(100) CHECK (email IS NULL OR length(email) <= 100),
    created_date DATETIME DEFAULT CURRENT_TIMESTAMP
)"#;

/// Number of rows shown from each table after setup.
const SAMPLE_SIZE: usize = 5;

/// What setup created, for the caller to display.
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub info_count: i64,
    pub users_count: i64,
    pub info_sample: Recordset,
    pub users_sample: Recordset,
    /// Typed view of `users_sample`.
    pub users: Vec<UserRecord>,
}

/// Drops, recreates and seeds both sample tables.
///
/// Running it repeatedly always leaves exactly the seed rows behind.
pub fn setup_database(config: &DatabaseConfig) -> Result<SetupReport> {
    info!("Starting database setup at {}", config.path.display());

    with_pool(config, |pool| {
        info!("Connected to database successfully");

        recreate_info(pool)?;
        recreate_users(pool)?;

        info!("Verifying data");
        let info_count = count_rows(pool, "info")?;
        let users_count = count_rows(pool, "users")?;

        let info_sample = pool
            .request()
            .input("limit", SqlType::Int, SAMPLE_SIZE as i64)
            .query("SELECT * FROM info ORDER BY id LIMIT @limit")?
            .recordset;
        let users_sample = pool
            .request()
            .input("limit", SqlType::Int, SAMPLE_SIZE as i64)
            .query("SELECT * FROM users ORDER BY id LIMIT @limit")?
            .recordset;
        let users = users_sample
            .iter()
            .map(UserRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        info!(info_count, users_count, "Database setup completed");
        Ok(SetupReport {
            info_count,
            users_count,
            info_sample,
            users_sample,
            users,
        })
    })
}

fn recreate_info(pool: &mut Pool) -> Result<()> {
    info!("Creating \"info\" table");
    pool.request().query("DROP TABLE IF EXISTS info")?;
    pool.request().query(CREATE_INFO_SQL)?;

    info!("Inserting sample data into \"info\" table");
    let tx = pool.transaction()?;
    for name in INFO_SEED {
        tx.request()
            .input("name", SqlType::VarChar(50), name)
            .query("INSERT INTO info (name) VALUES (@name)")?;
    }
    tx.commit()?;
    info!("Inserted {} records into \"info\" table", INFO_SEED.len());
    Ok(())
}

fn recreate_users(pool: &mut Pool) -> Result<()> {
    info!("Creating \"users\" table");
    pool.request().query("DROP TABLE IF EXISTS users")?;
    pool.request().query(CREATE_USERS_SQL)?;

    info!("Inserting sample data into \"users\" table");
    let tx = pool.transaction()?;
    for (name, email) in USERS_SEED {
        tx.request()
            .input("name", SqlType::VarChar(50), name)
            .input("email", SqlType::VarChar(100), email)
            .query("INSERT INTO users (name, email) VALUES (@name, @email)")?;
    }
    tx.commit()?;
    info!("Inserted {} records into \"users\" table", USERS_SEED.len());
    Ok(())
}

fn count_rows(pool: &Pool, table: &str) -> Result<i64> {
    let outcome = pool
        .request()
        .query(&format!("SELECT COUNT(*) AS count FROM {}", table))?;
    Ok(outcome.scalar_i64("count").unwrap_or(0))
}
