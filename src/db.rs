//! SQLite connection management, migrations, and the crate-wide error type.
//!
//! The SQLite backend keeps the state blob in a small key-value table. This
//! module opens connections with settings suited to a single local writer
//! that may occasionally race a second process (WAL mode, busy timeout),
//! applies the embedded schema migrations, and defines `DocsError`.

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Central error type for the documentation store.
///
/// Uses `thiserror` for the `Error` and `Display` impls, with `From`
/// conversions for the underlying library errors.
#[derive(Debug, Error)]
pub enum DocsError {
    /// SQLite backend operation failed.
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// I/O operation failed (state files, temp files, terminal).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored state or supplied JSON could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input provided by the user or caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The external editor could not be launched or exited with an error.
    #[error("Editor error: {0}")]
    Editor(String),
}

/// Opens a SQLite connection at the specified path with proper settings.
///
/// - **WAL mode**: readers are not blocked by the writer
/// - **Busy timeout**: 5 seconds, so a second process waits instead of failing
///
/// # Errors
///
/// Returns `DocsError::Db` if the connection cannot be opened or configured.
pub fn open_connection_at(path: &Path) -> Result<Connection, DocsError> {
    let conn = Connection::open(path)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;

    Ok(conn)
}

/// Runs all pending schema migrations.
///
/// Reads the current version from `schema_meta` (0 when the table does not
/// exist yet) and applies each embedded migration with a higher version in
/// its own transaction. Running it twice is a no-op.
///
/// # Errors
///
/// Returns `DocsError::Db` if a migration fails; that migration's
/// transaction is rolled back.
pub fn run_migrations(conn: &mut Connection) -> Result<(), DocsError> {
    let current_version: i64 = conn
        .query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    let migrations: Vec<(i64, &str)> = vec![(1, include_str!("../migrations/001_initial.sql"))];

    for (target_version, sql) in migrations {
        if target_version > current_version {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.commit()?;
            tracing::debug!(version = target_version, "applied migration");
        }
    }

    Ok(())
}
