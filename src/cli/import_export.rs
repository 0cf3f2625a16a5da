use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use rusqlite::{params_from_iter, Connection, Transaction};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{self, quote_column, CellValue, ConnectOptions, DbError, TableName};

/// SQLite's default cap on bound parameters per statement.
const MAX_BIND_PARAMS: usize = 999;

/// Configuration for importing a CSV file into a table.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Target table name, as typed by the operator.
    pub table: String,
    /// Path to the CSV file; its first record is the header.
    pub path: PathBuf,
    /// Optional list of CSV columns to import.
    /// If None, every header column is imported.
    pub columns: Option<Vec<String>>,
}

/// Summary of an import operation.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    /// Table the rows went into.
    pub table: String,
    /// Number of rows inserted.
    pub rows_imported: u64,
}

/// Configuration for exporting a table to a CSV file.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Source table name.
    pub table: String,
    /// Output CSV path; overwritten if it exists.
    pub path: PathBuf,
}

/// Summary of an export operation.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Table that was read.
    pub table: String,
    /// File that was written.
    pub path: PathBuf,
    /// Number of data rows written (the header is not counted).
    pub rows_exported: u64,
}

/// Error type for the data operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// The database could not be opened. Callers treat this as fatal.
    #[error("could not connect to database: {0}")]
    Connect(#[source] DbError),
    /// A requested column is absent from the CSV header.
    #[error("column '{0}' not found in CSV header")]
    MissingColumn(String),
    /// A column was requested twice.
    #[error("column '{0}' requested more than once")]
    DuplicateColumn(String),
    /// A data record is shorter than the columns being imported.
    #[error("CSV row {row} has no value for column '{column}'")]
    ShortRow {
        /// 1-based data row number (the header is row 0).
        row: u64,
        /// Column whose field is missing.
        column: String,
    },
    /// Identifier validation or other connection-layer error.
    #[error(transparent)]
    Db(#[from] DbError),
    /// SQLite error raised while executing a statement.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// IO error from file operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// CSV parsing or writing error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl CliError {
    /// True for failures to acquire a connection, which end the process.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, CliError::Connect(_))
    }
}

/// Imports a CSV file into a table in one transaction.
///
/// The whole file is read and projected before a connection is opened, so a
/// column that is missing from the header aborts the import without touching
/// the database. Inserts run as multi-row statements inside one transaction;
/// any failure rolls the transaction back and nothing is imported.
///
/// # Arguments
/// * `cfg` - Import configuration specifying the table, file and columns
/// * `opts` - Options for opening the database
///
/// # Returns
/// An `ImportSummary` with the number of rows inserted, or a `CliError` on failure.
pub fn run_import(cfg: &ImportConfig, opts: &ConnectOptions) -> Result<ImportSummary, CliError> {
    let table = TableName::parse(&cfg.table)?;
    let batch = read_import_batch(&cfg.path, cfg.columns.as_deref())?;

    let mut conn = db::connect(opts).map_err(CliError::Connect)?;
    let outcome = insert_batch(&mut conn, &table, &batch);
    db::close(conn);
    let rows_imported = outcome?;

    info!(table = %table, rows = rows_imported, file = %cfg.path.display(), "import committed");
    Ok(ImportSummary {
        table: cfg.table.clone(),
        rows_imported,
    })
}

/// Exports every row of a table to a CSV file, header first.
///
/// Nothing is written to the database, so a failure needs no rollback. The
/// output file is only created once the rows have been read.
///
/// # Arguments
/// * `cfg` - Export configuration specifying the table and output file
/// * `opts` - Options for opening the database
///
/// # Returns
/// An `ExportSummary` with the number of data rows written, or a `CliError` on failure.
pub fn run_export(cfg: &ExportConfig, opts: &ConnectOptions) -> Result<ExportSummary, CliError> {
    let table = TableName::parse(&cfg.table)?;

    let conn = db::connect(opts).map_err(CliError::Connect)?;
    let outcome = export_table(&conn, &table, &cfg.path);
    db::close(conn);
    let rows_exported = outcome?;

    info!(table = %table, rows = rows_exported, file = %cfg.path.display(), "export written");
    Ok(ExportSummary {
        table: cfg.table.clone(),
        path: cfg.path.clone(),
        rows_exported,
    })
}

#[derive(Debug)]
struct ColumnSpec {
    name: String,
    index: usize,
}

struct ImportBatch {
    /// Column names, already quoted for SQL text.
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn read_import_batch(path: &Path, requested: Option<&[String]>) -> Result<ImportBatch, CliError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CliError::Message(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let columns = resolve_columns(&headers, requested).inspect_err(|err| {
        warn!(file = %path.display(), error = %err, "CSV columns do not match");
    })?;

    let quoted = columns
        .iter()
        .map(|col| quote_column(&col.name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        rows.push(project_record(&record, &columns, idx as u64 + 1)?);
    }

    Ok(ImportBatch {
        columns: quoted,
        rows,
    })
}

fn resolve_columns(
    headers: &StringRecord,
    requested: Option<&[String]>,
) -> Result<Vec<ColumnSpec>, CliError> {
    let Some(list) = requested else {
        return Ok(headers
            .iter()
            .enumerate()
            .map(|(index, header)| ColumnSpec {
                name: header.to_string(),
                index,
            })
            .collect());
    };

    if list.is_empty() {
        return Err(CliError::Message("no columns requested for import".into()));
    }
    let mut cols: Vec<ColumnSpec> = Vec::with_capacity(list.len());
    for name in list {
        if cols.iter().any(|col| col.name == *name) {
            return Err(CliError::DuplicateColumn(name.clone()));
        }
        let index = find_column(headers, name)?;
        cols.push(ColumnSpec {
            name: name.clone(),
            index,
        });
    }
    Ok(cols)
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize, CliError> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .ok_or_else(|| CliError::MissingColumn(name.to_string()))
}

fn project_record(
    record: &StringRecord,
    columns: &[ColumnSpec],
    row: u64,
) -> Result<Vec<String>, CliError> {
    columns
        .iter()
        .map(|col| {
            record
                .get(col.index)
                .map(str::to_string)
                .ok_or_else(|| CliError::ShortRow {
                    row,
                    column: col.name.clone(),
                })
        })
        .collect()
}

fn insert_batch(
    conn: &mut Connection,
    table: &TableName,
    batch: &ImportBatch,
) -> Result<u64, CliError> {
    let tx = conn.transaction()?;
    match insert_rows(&tx, table, batch) {
        Ok(inserted) => {
            tx.commit()?;
            Ok(inserted)
        }
        Err(err) => {
            warn!(table = %table, error = %err, "import failed, rolling back");
            db::rollback(tx);
            Err(err)
        }
    }
}

fn insert_rows(
    tx: &Transaction<'_>,
    table: &TableName,
    batch: &ImportBatch,
) -> Result<u64, CliError> {
    if batch.rows.is_empty() {
        return Ok(0);
    }

    let column_list = batch.columns.join(", ");
    let tuple = format!("({})", vec!["?"; batch.columns.len()].join(", "));
    let rows_per_statement = (MAX_BIND_PARAMS / batch.columns.len()).max(1);

    let mut inserted = 0u64;
    for chunk in batch.rows.chunks(rows_per_statement) {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table.quoted(),
            column_list,
            vec![tuple.as_str(); chunk.len()].join(", ")
        );
        let mut stmt = tx.prepare_cached(&sql)?;
        inserted += stmt.execute(params_from_iter(chunk.iter().flatten()))? as u64;
    }
    Ok(inserted)
}

fn export_table(conn: &Connection, table: &TableName, path: &Path) -> Result<u64, CliError> {
    let snapshot = db::fetch_all(conn, table)?;

    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(&snapshot.columns)?;
    for row in &snapshot.rows {
        writer.write_record(row.iter().map(CellValue::to_csv_field))?;
    }
    writer.flush()?;
    Ok(snapshot.len() as u64)
}
