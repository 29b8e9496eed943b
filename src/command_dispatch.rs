//! Purpose: Hold top-level CLI command dispatch for `rowfile`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Alive-row filtering happens here, downstream of the scanner.
//! Invariants: Stdout formats are stable (human or JSON by command/flags).

use super::*;

use rowfile::core::table::{FlipOutcome, Table};

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "rowfile", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Create { file, schema } => {
            let schema = parse_schema(&schema)?;
            Table::create(&file, schema)?;
            println!("created {}", file.display());
            Ok(RunOutcome::ok())
        }
        Command::Describe { schema } => {
            let schema = parse_schema(&schema)?;
            let mut stdout = io::stdout();
            schema
                .describe(&mut stdout)
                .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
            Ok(RunOutcome::ok())
        }
        Command::Add {
            file,
            schema,
            values,
        } => {
            let schema = parse_schema(&schema)?;
            let mut table = Table::open(&file, schema)?;
            let values: Vec<&[u8]> = values.iter().map(|value| value.as_bytes()).collect();
            let index = table.add(&values)?;
            println!("{index}");
            Ok(RunOutcome::ok())
        }
        Command::Delete {
            file,
            schema,
            index,
        } => {
            let schema = parse_schema(&schema)?;
            let mut table = Table::open(&file, schema)?;
            match table.delete(index)? {
                FlipOutcome::Flipped => println!("deleted"),
                FlipOutcome::Already => println!("already deleted"),
            }
            Ok(RunOutcome::ok())
        }
        Command::Resurrect {
            file,
            schema,
            index,
        } => {
            let schema = parse_schema(&schema)?;
            let mut table = Table::open(&file, schema)?;
            match table.resurrect(index)? {
                FlipOutcome::Flipped => println!("resurrected"),
                FlipOutcome::Already => println!("already alive"),
            }
            Ok(RunOutcome::ok())
        }
        Command::List {
            file,
            schema,
            all,
            json,
        } => {
            let schema = parse_schema(&schema)?;
            let table = Table::open(&file, schema)?;
            let mut scan = table.scan()?;
            while let Some(row) = scan.next()? {
                if !all && !row.alive {
                    continue;
                }
                if json {
                    let values: Vec<String> = row
                        .values
                        .iter()
                        .map(|value| String::from_utf8_lossy(value).into_owned())
                        .collect();
                    let value = json!({
                        "index": row.index,
                        "alive": row.alive,
                        "values": values,
                    });
                    println!("{value}");
                } else {
                    print!("{}", row.index);
                    if all {
                        print!(" | {}", if row.alive { '+' } else { '-' });
                    }
                    for value in &row.values {
                        print!(" | {}", String::from_utf8_lossy(value));
                    }
                    println!();
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Shell { file, schema } => {
            let schema = parse_schema(&schema)?;
            let mut table = Table::open(&file, schema)?;
            let mut stdout = io::stdout();
            table
                .schema()
                .describe(&mut stdout)
                .map_err(|err| Error::new(ErrorKind::Io).with_source(err))?;
            shell::run(&mut table)?;
            Ok(RunOutcome::ok())
        }
    }
}
