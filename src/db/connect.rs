use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags, Transaction};
use tracing::{error, info, warn};

use crate::db::error::{DbError, Result};
use crate::db::options::ConnectOptions;

/// Opens a connection for a single operation.
///
/// Logs one line on success and one on failure. There is no retry and no
/// pooling: every operation calls this and closes the handle with [`close`]
/// before returning.
///
/// # Errors
///
/// Returns an error if the database doesn't exist and `create_if_missing` is
/// false, or if the file cannot be opened as a SQLite database.
pub fn connect(opts: &ConnectOptions) -> Result<Connection> {
    match open_connection(opts) {
        Ok(conn) => {
            info!(path = %opts.path.display(), "connected to database");
            Ok(conn)
        }
        Err(err) => {
            error!(path = %opts.path.display(), error = %err, "failed to connect to database");
            Err(err)
        }
    }
}

/// Closes a connection explicitly, logging instead of failing when SQLite refuses.
pub fn close(conn: Connection) {
    if let Err((_conn, err)) = conn.close() {
        warn!(error = %err, "failed to close database connection");
    }
}

/// Rolls back `tx`, logging a rollback that itself fails.
pub fn rollback(tx: Transaction<'_>) {
    if let Err(err) = tx.rollback() {
        warn!(error = %err, "rollback failed");
    }
}

fn open_connection(opts: &ConnectOptions) -> Result<Connection> {
    let mut flags = OpenFlags::default();
    if !opts.path.exists() {
        if !opts.create_if_missing {
            return Err(DbError::missing_database(&opts.path));
        }
        ensure_parent_dir(&opts.path)?;
    } else {
        flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
    }

    let conn = Connection::open_with_flags(&opts.path, flags)?;
    if let Some(mode) = opts.synchronous {
        conn.pragma_update(None, "synchronous", mode.as_pragma())?;
    }
    // SQLite opens lazily; touch the schema so a non-database file fails here.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(conn)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
