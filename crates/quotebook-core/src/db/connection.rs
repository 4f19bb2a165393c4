//! Database connection management

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::migrations;
use crate::error::{Error, Result};
use crate::storage::SnapshotStorage;
use crate::util::unix_timestamp_millis_now;

/// Shared handle to a `SQLite` key/value store.
///
/// Clones share one connection, so the quote store and the category index can
/// each hold a handle to the same file.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open a database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let database = Self::from_connection(conn)?;
        tracing::debug!("Opened quote database at {}", path.display());
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure(&conn);
        migrations::run(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage("database connection lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("Database").finish_non_exhaustive()
    }
}

/// Configure `SQLite` for a small single-writer store
fn configure(conn: &Connection) {
    for (pragma, value) in [("journal_mode", "WAL"), ("synchronous", "NORMAL")] {
        // In-memory databases keep their own journal mode.
        if let Err(error) = conn.pragma_update(None, pragma, value) {
            tracing::debug!("Skipping {pragma} = {value}: {error}");
        }
    }
}

impl SnapshotStorage for Database {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, unix_timestamp_millis_now()],
        )?;
        Ok(())
    }
}
