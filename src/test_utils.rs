/// # Test Utilities Module
///
/// Fixtures for unit tests. Examples open and close their own pool per call,
/// so fixtures hand out a file-backed database in a temporary directory
/// rather than an in-memory connection.

use crate::config::DatabaseConfig;
use crate::core::db::Pool;
use crate::setup::setup_database;
use tempfile::TempDir;

/// A database file that lives as long as the fixture.
pub struct TempDatabase {
    _dir: TempDir,
    pub config: DatabaseConfig,
}

impl TempDatabase {
    /// Empty database in a fresh temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig::at(dir.path().join("sqldemo.db"));
        TempDatabase { _dir: dir, config }
    }

    /// Database with the sample tables created and seeded.
    pub fn seeded() -> Self {
        let db = Self::new();
        setup_database(&db.config).expect("Failed to seed test database");
        db
    }

    /// Opens a pool on the fixture database.
    pub fn pool(&self) -> Pool {
        Pool::connect(&self.config).expect("Failed to open test database")
    }

    /// Runs raw SQL against the fixture, bypassing the request layer.
    pub fn execute(&self, sql: &str) {
        self.pool()
            .connection()
            .execute_batch(sql)
            .expect("Failed to execute fixture SQL");
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> i64 {
        self.pool()
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .expect("Failed to count rows")
    }

    /// Names in `info`, ordered by id.
    pub fn info_names(&self) -> Vec<String> {
        let pool = self.pool();
        let mut stmt = pool
            .connection()
            .prepare("SELECT name FROM info ORDER BY id")
            .expect("Failed to prepare name query");
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .expect("Failed to query names")
            .collect::<rusqlite::Result<Vec<_>>>()
            .expect("Failed to read names");
        names
    }
}

/// Asserts that a `Result` is the given `DemoError` variant.
#[macro_export]
macro_rules! assert_demo_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::DemoError::$expected_type(_)) => {}
            Ok(_) => panic!("Expected {} error but got Ok in {}", stringify!($expected_type), $context),
            Err(other) => panic!("Expected {} but got {:?} in {}", stringify!($expected_type), other, $context),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_fixture() {
        let db = TempDatabase::seeded();
        assert_eq!(db.count("info"), 10);
        assert_eq!(db.count("users"), 5);
        assert_eq!(db.info_names()[1], "Jane Smith");
    }
}
