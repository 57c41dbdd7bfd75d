//! Purpose: Hold top-level CLI command dispatch for `advcsv`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Input is a file path or stdin; the library owns all CSV handling.
//! Invariants: Output is written only after the whole input decoded successfully.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use advcsv::api::{Decoder, read_headers};
use clap::CommandFactory;
use serde_json::{Value, json};

use super::*;
use crate::projection::{ProjectedRow, Projection};

pub(super) fn dispatch_command(
    command: Command,
    options: DecodeOptions,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "advcsv", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Headers { input } => {
            let headers = read_headers(open_input(input.as_deref())?, &options)?;
            let entries = headers
                .iter()
                .enumerate()
                .map(|(index, name)| json!({ "index": index, "name": name }))
                .collect::<Vec<_>>();
            emit_json(&json!({ "headers": entries }))?;
            Ok(RunOutcome::ok())
        }
        Command::Project {
            input,
            columns,
            jsonl,
        } => {
            let projection = Projection::parse(&columns)?;
            let schema = projection.schema();
            let mut rows: Vec<ProjectedRow> = Vec::new();
            Decoder::new(options).decode_with_schema(
                open_input(input.as_deref())?,
                &schema,
                &mut rows,
            )?;

            let values = rows
                .iter()
                .map(|row| projection.to_json(row))
                .collect::<Vec<_>>();
            if jsonl {
                emit_json_lines(&values)?;
            } else {
                emit_json(&Value::Array(values))?;
            }
            Ok(RunOutcome::ok())
        }
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, Error> {
    match path {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to open {}", path.display()))
                    .with_source(err)
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn write_error(err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write output")
        .with_source(err)
}

fn emit_json(value: &Value) -> Result<(), Error> {
    let text = serde_json::to_string_pretty(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("json encode failed")
            .with_source(err)
    })?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(write_error)
}

fn emit_json_lines(values: &[Value]) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    for value in values {
        writeln!(stdout, "{value}").map_err(write_error)?;
    }
    stdout.flush().map_err(write_error)
}
