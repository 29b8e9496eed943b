//! Purpose: Interactive shell over a single open table.
//! Exports: `run`.
//! Role: Line-at-a-time command loop for the `rowfile shell` subcommand.
//! Invariants: The command table is built once at startup and passed
//! explicitly; handlers receive the table handle and parsed arguments only.
//! Invariants: Handler errors are printed and the loop continues; only
//! `exit` and EOF leave the loop.
use std::io::{self, BufRead, Write};

use rowfile::core::error::{Error, ErrorKind};
use rowfile::core::table::{FlipOutcome, Table};
use rowfile::token::tokenize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

type Handler = fn(&mut Table, &[String], &[ShellCommand]) -> Result<Flow, Error>;

struct ShellCommand {
    name: &'static str,
    help: &'static str,
    run: Handler,
}

fn shell_commands() -> Vec<ShellCommand> {
    vec![
        ShellCommand {
            name: "help",
            help: "help [cmd] -- print help on `cmd` or general help",
            run: help_command,
        },
        ShellCommand {
            name: "exit",
            help: "exit -- close shell",
            run: exit_command,
        },
        ShellCommand {
            name: "describe",
            help: "describe -- print the column listing",
            run: describe_command,
        },
        ShellCommand {
            name: "add",
            help: "add <value1> ... -- append a row, one value per column",
            run: add_command,
        },
        ShellCommand {
            name: "delete",
            help: "delete <index> -- tombstone the row at <index>",
            run: delete_command,
        },
        ShellCommand {
            name: "resurrect",
            help: "resurrect <index> -- revive the tombstoned row at <index>",
            run: resurrect_command,
        },
        ShellCommand {
            name: "list",
            help: "list [all] -- print alive rows, or every row with `all`",
            run: list_command,
        },
    ]
}

pub fn run(table: &mut Table) -> Result<(), Error> {
    let commands = shell_commands();
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("$ ");
        io::stdout()
            .flush()
            .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
        if read == 0 {
            println!("^D");
            return Ok(());
        }
        match run_line(table, line.trim_end_matches('\n'), &commands) {
            Ok(Flow::Exit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(err) => {
                println!("error: {err}");
                if let Some(hint) = err.hint() {
                    println!("hint: {hint}");
                }
            }
        }
        println!();
    }
}

fn run_line(table: &mut Table, line: &str, commands: &[ShellCommand]) -> Result<Flow, Error> {
    let tokens = tokenize(line)?;
    let Some(name) = tokens.first() else {
        println!("Use `help [cmd]` for help on specific command or in general");
        return Ok(Flow::Continue);
    };
    let Some(command) = commands.iter().find(|command| command.name == name.as_str()) else {
        println!("Unknown command `{name}`. For list of commands use `help`");
        return Ok(Flow::Continue);
    };
    (command.run)(table, &tokens[1..], commands)
}

fn help_command(
    _table: &mut Table,
    args: &[String],
    commands: &[ShellCommand],
) -> Result<Flow, Error> {
    match args {
        [] => {
            println!("General syntax: <cmd> <args...>\n");
            for command in commands {
                println!("{}", command.help);
            }
        }
        [name] => match commands.iter().find(|command| command.name == name.as_str()) {
            Some(command) => println!("{}", command.help),
            None => println!("Unknown command `{name}`. Use `help` for list of commands"),
        },
        _ => println!("`help` accepts either one or no arguments"),
    }
    Ok(Flow::Continue)
}

fn exit_command(
    _table: &mut Table,
    args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    if !args.is_empty() {
        println!("`exit` doesn't accept arguments. Anyway, exiting");
    }
    Ok(Flow::Exit)
}

fn describe_command(
    table: &mut Table,
    _args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    let mut stdout = io::stdout();
    table
        .schema()
        .describe(&mut stdout)
        .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
    Ok(Flow::Continue)
}

fn add_command(
    table: &mut Table,
    args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    let expected = table.schema().columns().len();
    if args.len() != expected {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("expected {expected} values, got {}", args.len()))
            .with_hint("Pass one value per column; quote values containing spaces."));
    }
    let values: Vec<&[u8]> = args.iter().map(|value| value.as_bytes()).collect();
    let index = table.add(&values)?;
    println!("{index}");
    Ok(Flow::Continue)
}

fn delete_command(
    table: &mut Table,
    args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    match table.delete(parse_index(args)?)? {
        FlipOutcome::Flipped => println!("deleted"),
        FlipOutcome::Already => println!("already deleted"),
    }
    Ok(Flow::Continue)
}

fn resurrect_command(
    table: &mut Table,
    args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    match table.resurrect(parse_index(args)?)? {
        FlipOutcome::Flipped => println!("resurrected"),
        FlipOutcome::Already => println!("already alive"),
    }
    Ok(Flow::Continue)
}

fn list_command(
    table: &mut Table,
    args: &[String],
    _commands: &[ShellCommand],
) -> Result<Flow, Error> {
    let include_dead = match args {
        [] => false,
        [flag] if flag == "all" => true,
        _ => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("`list` accepts either no arguments or `all`"));
        }
    };

    let mut scan = table.scan()?;
    while let Some(row) = scan.next()? {
        if !include_dead && !row.alive {
            continue;
        }
        print!("{}", row.index);
        if include_dead {
            print!(" | {}", if row.alive { '+' } else { '-' });
        }
        for value in &row.values {
            print!(" | {}", String::from_utf8_lossy(value));
        }
        println!();
    }
    Ok(Flow::Continue)
}

fn parse_index(args: &[String]) -> Result<u64, Error> {
    let [raw] = args else {
        return Err(Error::new(ErrorKind::Usage).with_message("expected exactly one row index"));
    };
    raw.parse::<u64>().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("`{raw}` is not a row index"))
            .with_hint("Row indices are non-negative integers.")
    })
}

#[cfg(test)]
mod tests {
    use super::{Flow, run_line, shell_commands};
    use rowfile::core::error::ErrorKind;
    use rowfile::core::schema::{Column, Schema};
    use rowfile::core::table::Table;

    fn temp_table(dir: &tempfile::TempDir) -> Table {
        let schema = Schema::new(vec![Column::new("a", 4), Column::new("b", 3)]).expect("schema");
        Table::create(dir.path().join("table.rows"), schema).expect("create")
    }

    #[test]
    fn add_then_delete_flows_through_the_command_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut table = temp_table(&dir);
        let commands = shell_commands();

        let flow = run_line(&mut table, r#"add "a b" c"#, &commands).expect("add");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(table.row_count().expect("count"), 1);

        run_line(&mut table, "delete 0", &commands).expect("delete");
        let mut scan = table.scan().expect("scan");
        let row = scan.next().expect("next").expect("some");
        assert!(!row.alive);
        assert_eq!(row.values[0], b"a b".to_vec());
    }

    #[test]
    fn exit_terminates_the_loop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut table = temp_table(&dir);
        let flow = run_line(&mut table, "exit", &shell_commands()).expect("exit");
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn unknown_command_and_empty_line_continue() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut table = temp_table(&dir);
        let commands = shell_commands();
        assert_eq!(run_line(&mut table, "", &commands).expect("empty"), Flow::Continue);
        assert_eq!(run_line(&mut table, "frobnicate", &commands).expect("unknown"), Flow::Continue);
    }

    #[test]
    fn add_arity_is_checked_before_the_store_is_touched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut table = temp_table(&dir);
        let err = run_line(&mut table, "add onlyone", &shell_commands()).expect_err("arity");
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(table.row_count().expect("count"), 0);
    }

    #[test]
    fn bad_index_is_usage_not_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut table = temp_table(&dir);
        let err = run_line(&mut table, "delete nope", &shell_commands()).expect_err("index");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
