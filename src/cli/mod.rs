#![forbid(unsafe_code)]

//! The four data operations behind the menu and the subcommands.
//!
//! Every operation opens its own connection, does its work, and closes the
//! connection before returning. Errors come back as [`CliError`]; callers
//! decide whether to report and carry on or to stop.

/// CSV import into a table and table export to CSV.
pub mod import_export;

/// Whole-table delete and listing.
pub mod table;

pub use import_export::{
    run_export, run_import, CliError, ExportConfig, ExportSummary, ImportConfig, ImportSummary,
};
pub use table::{run_delete, run_list, DeleteSummary};
