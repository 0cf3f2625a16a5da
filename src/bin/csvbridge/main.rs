//! Binary entry point for the csvbridge CLI.
#![forbid(unsafe_code)]

mod config;
mod logging;
mod menu;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use csvbridge::{
    cli::{run_delete, run_export, run_import, run_list, CliError, ExportConfig, ImportConfig},
    db::{ConnectOptions, Synchronous},
};
use serde::Serialize;
use tracing::error;

use crate::config::{CliConfig, ConfigError, ProfileUpdate};
use crate::menu::Menu;
use crate::ui::{format_duration, Theme, Ui};

const DEFAULT_LOG_FILE: &str = "csvbridge.log";
const NO_DATABASE: &str =
    "no database configured; pass --database, set CSVBRIDGE_DATABASE or save a profile";

#[derive(Parser, Debug)]
#[command(
    name = "csvbridge",
    version,
    about = "Move table data between a SQLite database and CSV files",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    open: OpenArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for command summaries"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = ThemeArg::Auto,
        help = "Colour theme for terminal output"
    )]
    theme: ThemeArg,

    #[arg(long, global = true, help = "Only print data and errors")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct OpenArgs {
    #[arg(
        long,
        global = true,
        env = "CSVBRIDGE_CONFIG",
        value_name = "FILE",
        help = "Config file (defaults to the user config directory)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "CSVBRIDGE_PROFILE",
        help = "Named connection profile from the config file"
    )]
    profile: Option<String>,

    #[arg(
        long,
        global = true,
        env = "CSVBRIDGE_DATABASE",
        value_name = "DB",
        help = "SQLite database file (overrides the profile)"
    )]
    database: Option<PathBuf>,

    #[arg(long, global = true, help = "Create the database if it does not exist")]
    create: bool,

    #[arg(long, global = true, value_enum, help = "SQLite synchronous mode override")]
    synchronous: Option<SynchronousArg>,

    #[arg(
        long,
        global = true,
        env = "CSVBRIDGE_LOG_FILE",
        value_name = "FILE",
        help = "Append log events to this file"
    )]
    log_file: Option<PathBuf>,

    #[arg(long, global = true, conflicts_with = "log_file", help = "Disable the log file")]
    no_log_file: bool,
}

#[derive(Args, Debug)]
struct ImportCmd {
    #[arg(value_name = "TABLE")]
    table: String,

    #[arg(value_name = "CSV")]
    file: PathBuf,

    #[arg(
        long,
        value_name = "col1,col2",
        help = "Import only these CSV columns (default: the whole header)"
    )]
    columns: Option<String>,
}

#[derive(Args, Debug)]
struct ExportCmd {
    #[arg(value_name = "TABLE")]
    table: String,

    #[arg(value_name = "CSV")]
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Data(DataCmd),

    #[command(subcommand, about = "Manage connection profiles in the config file")]
    Profile(ProfileCmd),
}

#[derive(Subcommand, Debug)]
enum DataCmd {
    #[command(about = "Interactive menu (the default when no command is given)")]
    Menu,

    #[command(about = "Bulk-import a CSV file into a table")]
    Import(ImportCmd),

    #[command(about = "Export every row of a table to a CSV file")]
    Export(ExportCmd),

    #[command(about = "Delete all rows from a table")]
    Delete {
        #[arg(value_name = "TABLE")]
        table: String,
    },

    #[command(about = "Print every row of a table")]
    List {
        #[arg(value_name = "TABLE")]
        table: String,

        #[arg(long, help = "Print the column names first")]
        headers: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCmd {
    #[command(about = "Show saved profiles")]
    List,

    #[command(about = "Create or update a profile")]
    Save {
        name: String,

        #[arg(long = "db", value_name = "DB", help = "Database file for this profile")]
        db: Option<PathBuf>,

        #[arg(long, value_name = "BOOL", help = "Create the database when missing")]
        create_if_missing: Option<bool>,

        #[arg(long = "sync", value_enum, value_name = "MODE", help = "Synchronous mode")]
        sync: Option<SynchronousArg>,

        #[arg(long = "default", help = "Also make this the default profile")]
        make_default: bool,
    },

    #[command(about = "Remove a profile")]
    Delete { name: String },

    #[command(about = "Set the default profile, or clear it when no name is given")]
    Default { name: Option<String> },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SynchronousArg {
    Full,
    Normal,
    Off,
}

impl SynchronousArg {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SynchronousArg::Full => "full",
            SynchronousArg::Normal => "normal",
            SynchronousArg::Off => "off",
        }
    }
}

impl From<SynchronousArg> for Synchronous {
    fn from(mode: SynchronousArg) -> Self {
        match mode {
            SynchronousArg::Full => Synchronous::Full,
            SynchronousArg::Normal => Synchronous::Normal,
            SynchronousArg::Off => Synchronous::Off,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let ui = Ui::new(cli.theme.into(), cli.quiet);
    let mut config = CliConfig::load(cli.open.config.clone())?;

    match cli.command.unwrap_or(Command::Data(DataCmd::Menu)) {
        Command::Profile(cmd) => run_profile(cmd, &mut config, &ui, cli.format),
        Command::Data(cmd) => {
            let log_file = resolve_log_file(&cli.open, &config);
            logging::init(log_file.as_deref(), !cli.quiet)?;
            let opts = build_connect_options(&cli.open, &config)?;
            run_data(cmd, &opts, &ui, cli.format)
        }
    }
}

fn run_data(
    cmd: DataCmd,
    opts: &ConnectOptions,
    ui: &Ui,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        DataCmd::Menu => {
            let stdin = std::io::stdin();
            Menu::new(ui, opts, stdin.lock()).run().map_err(fatal)?;
        }
        DataCmd::Import(cmd) => {
            let cfg = ImportConfig {
                table: cmd.table,
                path: cmd.file,
                columns: cmd.columns.as_deref().map(|raw| split_list(raw, ',')),
            };
            let task = ui.task(format!("importing {} into {}", cfg.path.display(), cfg.table));
            let outcome = run_import(&cfg, opts);
            let elapsed = task.finish();
            let summary = outcome.map_err(fatal)?;
            emit(format, &summary, || {
                ui.success(&format!(
                    "Imported {} rows into {} ({})",
                    summary.rows_imported,
                    summary.table,
                    format_duration(elapsed)
                ))
            })?;
        }
        DataCmd::Export(cmd) => {
            let cfg = ExportConfig {
                table: cmd.table,
                path: cmd.file,
            };
            let task = ui.task(format!("exporting {} to {}", cfg.table, cfg.path.display()));
            let outcome = run_export(&cfg, opts);
            let elapsed = task.finish();
            let summary = outcome.map_err(fatal)?;
            emit(format, &summary, || {
                ui.success(&format!(
                    "Exported {} rows from {} to {} ({})",
                    summary.rows_exported,
                    summary.table,
                    summary.path.display(),
                    format_duration(elapsed)
                ))
            })?;
        }
        DataCmd::Delete { table } => {
            let summary = run_delete(&table, opts).map_err(fatal)?;
            emit(format, &summary, || {
                ui.success(&format!("Deleted data from {}", summary.table))
            })?;
        }
        DataCmd::List { table, headers } => {
            let snapshot = run_list(&table, opts).map_err(fatal)?;
            emit(format, &snapshot, || {
                if headers {
                    ui.line(snapshot.columns.join(", "));
                }
                for row in snapshot.display_rows() {
                    ui.line(row);
                }
            })?;
        }
    }
    Ok(())
}

/// `--log-file`, then `[logging] file`, then `csvbridge.log` in the working directory.
fn resolve_log_file(args: &OpenArgs, config: &CliConfig) -> Option<PathBuf> {
    if args.no_log_file {
        return None;
    }
    Some(
        args.log_file
            .clone()
            .or_else(|| config.log_file().cloned())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
    )
}

fn run_profile(
    cmd: ProfileCmd,
    config: &mut CliConfig,
    ui: &Ui,
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        ProfileCmd::List => {
            let profiles: Vec<_> = config.profiles().cloned().collect();
            emit(format, &profiles, || {
                if let Some(path) = config.path() {
                    ui.info(&format!("Config file: {}", path.display()));
                }
                if profiles.is_empty() {
                    ui.info("No profiles saved");
                }
                let default = config.default_profile_name();
                for profile in &profiles {
                    let title = if default == Some(profile.name.as_str()) {
                        format!("{} (default)", profile.name)
                    } else {
                        profile.name.clone()
                    };
                    let database = profile.database.as_ref().map(|p| p.display());
                    let synchronous = profile.synchronous.map(SynchronousArg::as_str);
                    ui.section(
                        &title,
                        [
                            ("database", display_opt(database)),
                            ("create_if_missing", display_opt(profile.create_if_missing)),
                            ("synchronous", display_opt(synchronous)),
                        ],
                    );
                }
            })?;
        }
        ProfileCmd::Save {
            name,
            db,
            create_if_missing,
            sync,
            make_default,
        } => {
            let update = ProfileUpdate {
                database: db,
                create_if_missing,
                synchronous: sync,
            };
            config.upsert_profile(&name, update)?;
            if make_default {
                config.set_default_profile(Some(&name))?;
            }
            let path = config.persist()?;
            ui.success(&format!("Saved profile '{name}' to {}", path.display()));
        }
        ProfileCmd::Delete { name } => {
            config.delete_profile(&name)?;
            let path = config.persist()?;
            ui.success(&format!("Removed profile '{name}' from {}", path.display()));
        }
        ProfileCmd::Default { name } => {
            config.set_default_profile(name.as_deref())?;
            let path = config.persist()?;
            match name {
                Some(name) => ui.success(&format!(
                    "Default profile is now '{name}' ({})",
                    path.display()
                )),
                None => ui.success(&format!(
                    "Cleared the default profile ({})",
                    path.display()
                )),
            }
        }
    }
    Ok(())
}

/// Database target resolution: `--database`, then the profile, then `[database] default`.
fn build_connect_options(
    args: &OpenArgs,
    config: &CliConfig,
) -> Result<ConnectOptions, Box<dyn Error>> {
    let profile = match args.profile.as_deref().or(config.default_profile_name()) {
        Some(name) => Some(config.profile(name).ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
        })?),
        None => None,
    };

    let path = args
        .database
        .clone()
        .or_else(|| profile.and_then(|p| p.database.clone()))
        .or_else(|| config.default_db_path().cloned())
        .ok_or(NO_DATABASE)?;

    let create = args.create || profile.and_then(|p| p.create_if_missing).unwrap_or(false);
    let synchronous = args
        .synchronous
        .or_else(|| profile.and_then(|p| p.synchronous))
        .map(Synchronous::from);

    Ok(ConnectOptions::new(path)
        .create_if_missing(create)
        .synchronous(synchronous))
}

/// Logs an operation failure that ends the process.
///
/// Connection failures are skipped here; the connector already logged them.
fn fatal(err: CliError) -> Box<dyn Error> {
    if !err.is_connection_failure() {
        error!(error = %err, "operation failed");
    }
    Box::new(err)
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub(crate) fn split_list(input: &str, delim: char) -> Vec<String> {
    input
        .split(delim)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
