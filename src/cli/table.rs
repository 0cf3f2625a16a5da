use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::import_export::CliError;
use crate::db::{self, ConnectOptions, TableName, TableSnapshot};

/// Outcome of a delete. Carries no row count.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSummary {
    /// Table that was emptied.
    pub table: String,
}

/// Removes every row from `table` in one transaction.
///
/// Deleting from an already empty table succeeds. The number of removed rows
/// is not surfaced to the caller.
pub fn run_delete(table: &str, opts: &ConnectOptions) -> Result<DeleteSummary, CliError> {
    let name = TableName::parse(table)?;

    let mut conn = db::connect(opts).map_err(CliError::Connect)?;
    let outcome = delete_all(&mut conn, &name);
    db::close(conn);
    outcome?;

    info!(table = %name, "table emptied");
    Ok(DeleteSummary {
        table: table.to_string(),
    })
}

/// Reads every row of `table` for display.
pub fn run_list(table: &str, opts: &ConnectOptions) -> Result<TableSnapshot, CliError> {
    let name = TableName::parse(table)?;

    let conn = db::connect(opts).map_err(CliError::Connect)?;
    let outcome = db::fetch_all(&conn, &name);
    db::close(conn);
    let snapshot = outcome?;

    info!(table = %name, rows = snapshot.len(), "table listed");
    Ok(snapshot)
}

fn delete_all(conn: &mut Connection, table: &TableName) -> Result<(), CliError> {
    let tx = conn.transaction()?;
    match tx.execute(&format!("DELETE FROM {}", table.quoted()), []) {
        Ok(removed) => {
            tx.commit()?;
            debug!(table = %table, rows = removed, "delete committed");
            Ok(())
        }
        Err(err) => {
            warn!(table = %table, error = %err, "delete failed, rolling back");
            db::rollback(tx);
            Err(err.into())
        }
    }
}
