use std::path::PathBuf;

use serde::Serialize;

/// SQLite `synchronous` pragma levels accepted by the connector.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Synchronous {
    /// Sync on every commit.
    Full,
    /// Sync at critical moments only.
    Normal,
    /// Hand writes to the OS without syncing.
    Off,
}

impl Synchronous {
    /// Value passed to `PRAGMA synchronous`.
    pub fn as_pragma(self) -> &'static str {
        match self {
            Synchronous::Full => "FULL",
            Synchronous::Normal => "NORMAL",
            Synchronous::Off => "OFF",
        }
    }
}

/// Options used when opening a database connection for a single operation.
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Whether to create the database (and its parent directory) if it doesn't exist.
    pub create_if_missing: bool,
    /// Optional `synchronous` pragma override applied after opening.
    pub synchronous: Option<Synchronous>,
}

impl ConnectOptions {
    /// Options targeting `path` with every other setting at its default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
            synchronous: None,
        }
    }

    /// Sets whether a missing database file is created on connect.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets the `synchronous` pragma applied on connect.
    pub fn synchronous(mut self, mode: Option<Synchronous>) -> Self {
        self.synchronous = mode;
        self
    }
}
