use std::io::BufRead;
use std::path::PathBuf;

use csvbridge::cli::{
    run_delete, run_export, run_import, run_list, CliError, ExportConfig, ImportConfig,
};
use csvbridge::db::ConnectOptions;

use crate::split_list;
use crate::ui::Ui;

const MENU_ENTRIES: [&str; 5] = [
    "Import from csv",
    "Export to csv",
    "Delete data from table",
    "Display data from table",
    "Exit",
];

/// Interactive read-evaluate loop over `input`.
///
/// Runs one operation at a time until the operator picks Exit or input ends.
/// Operation errors are printed and the loop carries on; only a connection
/// failure is returned to the caller.
pub struct Menu<'a, R> {
    ui: &'a Ui,
    opts: &'a ConnectOptions,
    input: R,
}

impl<'a, R: BufRead> Menu<'a, R> {
    pub fn new(ui: &'a Ui, opts: &'a ConnectOptions, input: R) -> Self {
        Self { ui, opts, input }
    }

    pub fn run(mut self) -> Result<(), CliError> {
        loop {
            self.ui
                .menu("Please select to import from csv or export to csv:", &MENU_ENTRIES);
            let Some(choice) = self.ask("Enter your option : ")? else {
                return Ok(());
            };
            let finished = match choice.as_str() {
                "1" => self.import_from_csv()?,
                "2" => self.export_to_csv()?,
                "3" => self.delete_from_table()?,
                "4" => self.display_table()?,
                "5" => return Ok(()),
                _ => false,
            };
            if finished {
                return Ok(());
            }
        }
    }

    /// Each handler returns `true` when input ran out mid-prompt.
    fn import_from_csv(&mut self) -> Result<bool, CliError> {
        let Some(table) = self.ask("Please input the table name for data import : ")? else {
            return Ok(true);
        };
        let Some(file) = self.ask("Please input the csv file name for data import : ")? else {
            return Ok(true);
        };
        let Some(columns) = self.ask("Columns to import (comma separated, blank for all) : ")?
        else {
            return Ok(true);
        };

        self.ui.info(&format!("Importing from CSV to {table}..."));
        let cfg = ImportConfig {
            table,
            path: PathBuf::from(file),
            columns: (!columns.is_empty()).then(|| split_list(&columns, ',')),
        };
        let task = self.ui.task("importing");
        let outcome = run_import(&cfg, self.opts);
        task.finish();
        if let Some(summary) = self.settle(outcome)? {
            self.ui
                .success(&format!("Imported {} records", summary.rows_imported));
        }
        Ok(false)
    }

    fn export_to_csv(&mut self) -> Result<bool, CliError> {
        let Some(table) = self.ask("Please input the table name to export : ")? else {
            return Ok(true);
        };
        let Some(file) = self.ask("Please input the csv file name for data export : ")? else {
            return Ok(true);
        };

        self.ui.info(&format!("Exporting {table} to CSV..."));
        let cfg = ExportConfig {
            table,
            path: PathBuf::from(file),
        };
        let task = self.ui.task("exporting");
        let outcome = run_export(&cfg, self.opts);
        task.finish();
        if let Some(summary) = self.settle(outcome)? {
            self.ui.success(&format!(
                "Exported {} records to {}",
                summary.rows_exported,
                summary.path.display()
            ));
        }
        Ok(false)
    }

    fn delete_from_table(&mut self) -> Result<bool, CliError> {
        let Some(table) = self.ask("Please input the table name to delete all data : ")? else {
            return Ok(true);
        };
        if let Some(summary) = self.settle(run_delete(&table, self.opts))? {
            self.ui
                .success(&format!("Deleted data from {}", summary.table));
        }
        Ok(false)
    }

    fn display_table(&mut self) -> Result<bool, CliError> {
        let Some(table) = self.ask("Please input the table name to display data : ")? else {
            return Ok(true);
        };
        if let Some(snapshot) = self.settle(run_list(&table, self.opts))? {
            if snapshot.is_empty() {
                self.ui.info(&format!("{table} has no rows"));
            }
            for row in snapshot.display_rows() {
                self.ui.line(row);
            }
        }
        Ok(false)
    }

    /// Reports an operation error and swallows it, unless it is a connection failure.
    fn settle<T>(&self, outcome: Result<T, CliError>) -> Result<Option<T>, CliError> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_connection_failure() => Err(err),
            Err(err) => {
                self.ui.warn(&format!("Error: {err}"));
                Ok(None)
            }
        }
    }

    /// Prompts and reads one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        self.ui.prompt(prompt);
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.ui.line("");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
