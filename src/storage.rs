use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app_dirs::AppDirs;
use crate::error::StorageError;

/// Small string key-value boundary the recency history and the contest
/// deadline persist through. Values are opaque to the store.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: StateStore + ?Sized> StateStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// SQLite backed state, one row per key
#[derive(Debug)]
pub struct SqliteStateStore {
    conn: Connection,
}

impl SqliteStateStore {
    /// Open the state database at the default application location
    pub fn new() -> Result<Self, StorageError> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("mockcontest_state.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv_state (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(SqliteStateStore { conn })
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_state WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO kv_state (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv_state WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Process-local store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_set_get_remove() {
        let store = SqliteStateStore::open_in_memory().unwrap();

        assert_eq!(store.get("missing").unwrap(), None);

        store.set("contestEndAt", "1700000000000").unwrap();
        assert_eq!(
            store.get("contestEndAt").unwrap().as_deref(),
            Some("1700000000000")
        );

        store.set("contestEndAt", "1800000000000").unwrap();
        assert_eq!(
            store.get("contestEndAt").unwrap().as_deref(),
            Some("1800000000000")
        );

        store.remove("contestEndAt").unwrap();
        assert_eq!(store.get("contestEndAt").unwrap(), None);

        // Removing twice is fine
        store.remove("contestEndAt").unwrap();
    }

    #[test]
    fn test_sqlite_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");

        {
            let store = SqliteStateStore::open(&path).unwrap();
            store.set("recentPickedSlugs", r#"["two-sum"]"#).unwrap();
        }

        let reopened = SqliteStateStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("recentPickedSlugs").unwrap().as_deref(),
            Some(r#"["two-sum"]"#)
        );
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStateStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    fn write_through<S: StateStore>(store: S) {
        store.set("k", "v").unwrap();
    }

    #[test]
    fn test_shared_handles_write_to_same_store() {
        let store = Rc::new(MemoryStateStore::new());
        write_through(Rc::clone(&store));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        let plain = MemoryStateStore::new();
        write_through(&plain);
        assert_eq!(plain.get("k").unwrap().as_deref(), Some("v"));
    }
}
