//! Key-value storage backends for the persistent store.
//!
//! A backend is the host's key-value facility: string keys mapped to
//! serialized text. The store only ever touches one key, but backends are
//! general so tests and tools can inspect them.

use crate::db::{self, DocsError};
use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A string-keyed text store.
pub trait StorageBackend {
    /// Returns the value stored under `key`, or None if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, DocsError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), DocsError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), DocsError>;
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local backend. Nothing survives the process; used by tests and
/// the `memory` backend setting.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, DocsError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DocsError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DocsError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// File
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens a file backend rooted at `dir`, creating the directory.
    ///
    /// # Errors
    /// Returns `DocsError::Io` if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self, DocsError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, DocsError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocsError::Io(e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DocsError> {
        // Temp file + rename: readers never observe a partial blob.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;

        // rename does not replace an existing file on Windows
        if cfg!(windows) && path.exists() {
            fs::remove_file(&path)?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DocsError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocsError::Io(e)),
        }
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// Stores keys as rows of the `kv_store` table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path` and applies migrations.
    ///
    /// # Errors
    /// Returns `DocsError::Io` if the parent directory cannot be created and
    /// `DocsError::Db` if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, DocsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(db::open_connection_at(path)?)
    }

    /// Wraps an already-configured connection, applying migrations.
    pub fn from_connection(mut conn: Connection) -> Result<Self, DocsError> {
        db::run_migrations(&mut conn)?;
        Ok(Self { conn })
    }
}

impl StorageBackend for SqliteBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, DocsError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DocsError> {
        let now = crate::models::now_timestamp();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DocsError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}
