use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for the connection layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database file not found at the specified path.
    #[error("database not found: {0}")]
    MissingDatabase(PathBuf),
    /// Table or column name that cannot be used as an identifier.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The rejected name as supplied by the caller.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
    /// SQLite driver error.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for connection-layer operations.
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub(crate) fn missing_database(path: impl AsRef<Path>) -> Self {
        DbError::MissingDatabase(path.as_ref().to_path_buf())
    }

    pub(crate) fn invalid_identifier(name: &str, reason: &'static str) -> Self {
        DbError::InvalidIdentifier {
            name: name.to_string(),
            reason,
        }
    }
}
