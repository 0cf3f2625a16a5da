#![forbid(unsafe_code)]

//! Database access shared by every data operation.
//!
//! Each operation opens its own short-lived SQLite connection through
//! [`connect`], works inside it, and closes it with [`close`]. Table and column
//! names pass through [`TableName`] / [`quote_column`] before they reach SQL
//! text; values are always bound as parameters.

mod connect;
mod error;
mod ident;
mod options;
mod snapshot;
mod value;

/// Connection acquisition and release.
pub use connect::{close, connect, rollback};

/// Error types for the connection layer.
pub use error::{DbError, Result};

/// Identifier validation and quoting.
pub use ident::{quote_column, TableName};

/// Configuration for opening a connection.
pub use options::{ConnectOptions, Synchronous};

/// Whole-table reads.
pub use snapshot::{fetch_all, TableSnapshot};

/// Values as returned by the driver.
pub use value::{CellValue, RowDisplay};
