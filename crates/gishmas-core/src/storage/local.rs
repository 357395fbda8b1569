//! Device-local key-value storage.
//!
//! A single SQLite `kv` table standing in for browser local storage. Values
//! are opaque strings; guest lists are stored as JSON arrays, newest first.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use crate::error::{CoreError, LocalStorageError};
use crate::guest::Guest;

/// File name of the local storage database inside the data directory.
pub const LOCAL_DB_FILE: &str = "local_storage.db";

/// SQLite-backed key-value store.
pub struct LocalStorage {
    conn: Mutex<Connection>,
}

impl LocalStorage {
    /// Open the store in the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, CoreError> {
        let dir = data_dir()?;
        Ok(Self::open_at(&dir)?)
    }

    /// Open (or create) the store inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(dir: &Path) -> Result<Self, LocalStorageError> {
        let path = dir.join(LOCAL_DB_FILE);
        let conn = Connection::open(&path)
            .map_err(|source| LocalStorageError::OpenFailed { path, source })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store. Nothing survives the process.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot create the schema.
    pub fn open_memory() -> Result<Self, LocalStorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, LocalStorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave the kv table half
        // written, so a poisoned lock is still usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a value from the kv store.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Read the guest list under `key`.
    ///
    /// A missing key, a read failure, or JSON that does not parse all read
    /// as an empty list.
    pub fn load_guests(&self, key: &str) -> Vec<Guest> {
        let raw = match self.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read local guests");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(guests) => guests,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding malformed local guest cache");
                Vec::new()
            }
        }
    }

    /// Replace the guest list under `key`.
    pub fn save_guests(&self, key: &str, guests: &[Guest]) -> Result<(), LocalStorageError> {
        let json = serde_json::to_string(guests)?;
        self.set_item(key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::{GuestDraft, GuestStatus, SusLevel};
    use tempfile::TempDir;

    fn guest(name: &str) -> Guest {
        GuestDraft::new(name, "Hates holiday karaoke.", SusLevel::Medium, GuestStatus::Sus)
            .unwrap()
            .into_guest(format!("id-{name}"), Some(chrono::Utc::now()))
    }

    #[test]
    fn kv_store() {
        let store = LocalStorage::open_memory().unwrap();
        assert!(store.get_item("test").unwrap().is_none());
        store.set_item("test", "hello").unwrap();
        assert_eq!(store.get_item("test").unwrap().unwrap(), "hello");
        store.set_item("test", "again").unwrap();
        assert_eq!(store.get_item("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn guests_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = LocalStorage::open_at(dir.path()).unwrap();
            store.save_guests("k", &[guest("Elf"), guest("Santa")]).unwrap();
        }
        let store = LocalStorage::open_at(dir.path()).unwrap();
        let loaded = store.load_guests("k");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Elf");
    }

    #[test]
    fn malformed_cache_reads_as_empty() {
        let store = LocalStorage::open_memory().unwrap();
        store.set_item("k", "{not json").unwrap();
        assert!(store.load_guests("k").is_empty());
        assert!(store.load_guests("missing").is_empty());
    }
}
