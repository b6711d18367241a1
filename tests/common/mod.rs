//! Shared fixtures for integration tests.

use rusqlite::Connection;
use sqldemo::config::DatabaseConfig;
use sqldemo::setup::setup_database;
use tempfile::TempDir;

/// A seeded database file in its own temporary directory.
pub struct SampleDb {
    _dir: TempDir,
    pub config: DatabaseConfig,
}

impl SampleDb {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::at(dir.path().join("samples.db"));
        SampleDb { _dir: dir, config }
    }

    pub fn seeded() -> Self {
        let db = Self::empty();
        setup_database(&db.config).unwrap();
        db
    }

    fn open(&self) -> Connection {
        Connection::open(&self.config.path).unwrap()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.open()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    pub fn info_names(&self) -> Vec<String> {
        let conn = self.open();
        let mut stmt = conn.prepare("SELECT name FROM info ORDER BY id").unwrap();
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        names
    }
}
