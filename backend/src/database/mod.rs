//! Module for database connection setup and common utilities.
//!
//! This module is responsible for opening the SQLite database, running schema
//! migrations and handing the connection to query code. A single connection is
//! shared behind an async mutex; callers pass a closure to `Database::call`
//! that runs to completion while the lock is held.

pub mod migrations;
pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

pub use migrations::MigrationError;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("cannot open database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) the database file at `path` and upgrades its schema.
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(DatabaseError::Open)?;

        let db = Self::from_connection(conn)?;
        info!(path = %path.display(), "database ready");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open(":memory:")
    }

    fn from_connection(mut conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::Open)?;
        migrations::upgrade(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the connection.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E>,
    {
        let mut conn = self.conn.lock().await;
        f(&mut conn)
    }
}

/// Deletes every row of every table, children first. Used by the seeder
/// inside its own transaction.
pub fn reset(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "DELETE FROM grievance_updates;
         DELETE FROM grievances;
         DELETE FROM tasks;
         DELETE FROM applications;
         DELETE FROM opportunities;
         DELETE FROM calendar_events;
         DELETE FROM resources;
         DELETE FROM enrollments;
         DELETE FROM courses;
         DELETE FROM revoked_tokens;
         DELETE FROM users;",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        let version = db
            .call(|conn| migrations::read_version(conn))
            .await
            .unwrap();
        assert_eq!(version, migrations::REQUIRED_VERSION);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let enabled: bool = db
            .call(|conn| conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)))
            .await
            .unwrap();
        assert!(enabled);
    }

    #[test]
    fn reopening_a_file_keeps_the_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aegis.db");
        drop(Database::open(&path).unwrap());
        assert!(Database::open(&path).is_ok());
    }
}
