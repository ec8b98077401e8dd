//! Configuration loaded from environment variables, with CLI overrides.
//!
//! Resolution order for every setting: CLI flag, then environment variable,
//! then default.

use crate::backend::{FileBackend, MemoryBackend, SqliteBackend};
use crate::db::DocsError;
use crate::store::Store;
use std::env;
use std::path::{Path, PathBuf};

/// Which key-value facility backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    File,
    Memory,
    /// No storage facility: loads are empty, saves are dropped.
    None,
}

impl BackendKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sqlite" => Some(Self::Sqlite),
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::File => "file",
            Self::Memory => "memory",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    /// SQLite database file or state directory. None means the default
    /// location under the home directory.
    pub path: Option<PathBuf>,
    /// Tracing filter directive (e.g. `warn`, `pagekeep=debug`).
    pub log_filter: String,
    /// External editor command.
    pub editor: String,
}

impl Config {
    /// Load configuration from `PAGEKEEP_BACKEND`, `PAGEKEEP_PATH`,
    /// `PAGEKEEP_LOG`, `VISUAL` and `EDITOR`.
    ///
    /// # Errors
    /// Returns `DocsError::InvalidInput` for an unknown backend name.
    pub fn from_env() -> Result<Self, DocsError> {
        let backend = match env::var("PAGEKEEP_BACKEND") {
            Ok(name) => parse_backend(&name)?,
            Err(_) => BackendKind::Sqlite,
        };
        let path = env::var_os("PAGEKEEP_PATH").map(PathBuf::from);
        let log_filter = env::var("PAGEKEEP_LOG").unwrap_or_else(|_| "warn".to_string());
        let editor = env::var("VISUAL")
            .or_else(|_| env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string());

        Ok(Self {
            backend,
            path,
            log_filter,
            editor,
        })
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        backend: Option<&str>,
        path: Option<&Path>,
    ) -> Result<Self, DocsError> {
        if let Some(name) = backend {
            self.backend = parse_backend(name)?;
        }
        if let Some(p) = path {
            self.path = Some(p.to_path_buf());
        }
        Ok(self)
    }

    /// The storage location the configured backend will use, if it uses one.
    pub fn storage_path(&self) -> Result<Option<PathBuf>, DocsError> {
        resolve_path(self.backend, self.path.as_deref(), dirs::home_dir())
    }

    /// Open the configured backend and wrap it in a store.
    pub fn open_store(&self) -> Result<Store, DocsError> {
        let path = self.storage_path()?;
        tracing::debug!(backend = %self.backend, path = ?path, "opening store");

        let store = match (self.backend, path) {
            (BackendKind::Sqlite, Some(p)) => Store::new(Box::new(SqliteBackend::open(&p)?)),
            (BackendKind::File, Some(p)) => Store::new(Box::new(FileBackend::open(&p)?)),
            (BackendKind::Memory, _) => Store::new(Box::new(MemoryBackend::new())),
            _ => Store::detached(),
        };
        Ok(store)
    }
}

fn parse_backend(name: &str) -> Result<BackendKind, DocsError> {
    BackendKind::from_str(name).ok_or_else(|| {
        DocsError::InvalidInput(format!(
            "Unknown backend '{}'. Valid backends: sqlite, file, memory, none",
            name
        ))
    })
}

/// Storage location for `kind`.
///
/// An explicit path wins. Otherwise SQLite uses `~/.pagekeep/pagekeep.db`
/// and the file backend `~/.pagekeep/`. Memory and none need no path.
///
/// # Errors
/// Returns `DocsError::Io` if a default is needed and the home directory
/// cannot be determined.
pub fn resolve_path(
    kind: BackendKind,
    explicit: Option<&Path>,
    home: Option<PathBuf>,
) -> Result<Option<PathBuf>, DocsError> {
    if matches!(kind, BackendKind::Memory | BackendKind::None) {
        return Ok(None);
    }
    if let Some(p) = explicit {
        return Ok(Some(p.to_path_buf()));
    }

    let home = home.ok_or_else(|| {
        DocsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;
    let base = home.join(".pagekeep");
    Ok(Some(match kind {
        BackendKind::Sqlite => base.join("pagekeep.db"),
        _ => base,
    }))
}
