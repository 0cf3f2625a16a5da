use rusqlite::Connection;
use serde::Serialize;

use crate::db::error::Result;
use crate::db::ident::TableName;
use crate::db::value::{CellValue, RowDisplay};

/// Every row of a table, held in memory, with the column names in table order.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    /// Column names from the statement description.
    pub columns: Vec<String>,
    /// Rows in the order SQLite returned them.
    pub rows: Vec<Vec<CellValue>>,
}

impl TableSnapshot {
    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table had no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Console lines for each row, without headers.
    pub fn display_rows(&self) -> impl Iterator<Item = RowDisplay<'_>> + '_ {
        self.rows.iter().map(|row| RowDisplay(row))
    }
}

/// Reads all rows of `table`.
///
/// Column names come from the prepared statement before any row is stepped,
/// so an empty table still yields its header.
pub fn fetch_all(conn: &Connection, table: &TableName) -> Result<TableSnapshot> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table.quoted()))?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get_ref(idx).map(CellValue::from))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(TableSnapshot { columns, rows })
}
