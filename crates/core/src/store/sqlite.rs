//! SQLite-backed TTL key-value store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{KvStore, StoreError};

/// SQLite-backed key-value store with per-entry expiry.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Create a new SQLite store, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_kv_entries_expires_at ON kv_entries(expires_at);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT value, expires_at FROM kv_entries WHERE key = ?",
            params![key],
            |row| {
                let value: String = row.get(0)?;
                let expires_at: String = row.get(1)?;
                Ok((value, expires_at))
            },
        );

        match result {
            Ok((value, expires_at)) => {
                let expired = DateTime::parse_from_rfc3339(&expires_at)
                    .map(|dt| dt.with_timezone(&Utc) <= Utc::now())
                    .unwrap_or(true);

                if expired {
                    conn.execute("DELETE FROM kv_entries WHERE key = ?", params![key])
                        .map_err(|e| StoreError::Database(e.to_string()))?;
                    Ok(None)
                } else {
                    Ok(Some(value))
                }
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn put_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        let expires_at = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);

        conn.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, expires_at) VALUES (?, ?, ?)",
            params![key, value, expires_at.to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM kv_entries WHERE key = ?", params![key])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
