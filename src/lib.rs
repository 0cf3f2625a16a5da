//! Move table data between a SQLite database and CSV files.
//!
//! [`db`] owns connections, identifier quoting and value rendering; [`cli`]
//! holds the import, export, delete and list operations built on top of it.

#![warn(missing_docs)]

pub mod cli;
pub mod db;
