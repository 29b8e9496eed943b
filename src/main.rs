//! Purpose: `rowfile` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits results on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
//! Invariants: All table mutations go through `core::table::Table` (lock + codec).
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod shell;

use rowfile::core::error::{Error, ErrorKind, to_exit_code};
use rowfile::core::schema::{Column, Schema};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(err.to_string())
                    .with_hint("Run `rowfile --help` for usage."));
            }
        },
    };

    command_dispatch::dispatch_command(cli.command)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "rowfile",
    version,
    about = "Fixed-width row tables in plain files with soft delete",
    after_help = r#"EXAMPLES
  $ rowfile create people.rows --schema fio:32,phone:16
  $ rowfile add people.rows --schema fio:32,phone:16 "Ada Lovelace" 555-0100
  $ rowfile list people.rows --schema fio:32,phone:16
  $ rowfile delete people.rows --schema fio:32,phone:16 0
  $ rowfile shell people.rows --schema fio:32,phone:16

The schema is never stored in the file; every command must receive the same
--schema the file was created with."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new empty table file
    Create {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
    },
    /// Print the column listing for a schema
    Describe {
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
    },
    /// Append a row and print its index
    Add {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
        #[arg(required = true, help = "One value per column")]
        values: Vec<String>,
    },
    /// Tombstone the row at an index
    Delete {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
        index: u64,
    },
    /// Revive the tombstoned row at an index
    Resurrect {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
        index: u64,
    },
    /// Print rows in file order
    List {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
        #[arg(long, help = "Include tombstoned rows")]
        all: bool,
        #[arg(long, help = "Emit one JSON object per row")]
        json: bool,
    },
    /// Open an interactive shell over a table
    Shell {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Column spec, e.g. fio:32,phone:16")]
        schema: String,
    },
    /// Generate shell completions
    Completion { shell: Shell },
}

/// Parses `name:width,name:width` into a schema. The spec travels with every
/// command because the file carries no header to record it.
fn parse_schema(spec: &str) -> Result<Schema, Error> {
    let mut columns = Vec::new();
    for part in spec.split(',') {
        let Some((name, width)) = part.split_once(':') else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("malformed column `{part}`"))
                .with_hint("Each column is name:width, e.g. fio:32."));
        };
        let width: usize = width.parse().map_err(|_| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("column `{name}` has a non-numeric width `{width}`"))
                .with_hint("Widths are positive byte counts, e.g. fio:32.")
        })?;
        if name.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("column `{part}` has an empty name")));
        }
        columns.push(Column::new(name, width));
    }
    Schema::new(columns)
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }
    let value = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.to_string(),
            "hint": err.hint(),
        }
    });
    eprintln!("{value}");
}
