//! Purpose: `advcsv` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit JSON on stdout (pretty, or JSON Lines with `--jsonl`).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod projection;

use advcsv::api::{DecodeOptions, DuplicateHeaders, Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run<I>(args: I) -> Result<RunOutcome, Error>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
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
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage).with_message(clap_error_summary(&err)));
            }
        },
    };

    let options = cli.dialect.options();
    command_dispatch::dispatch_command(cli.command, options)
}

#[derive(Parser)]
#[command(
    name = "advcsv",
    version,
    about = "Decode CSV columns by header name",
    arg_required_else_help = true,
    after_help = r#"EXAMPLES
  $ advcsv headers posts.csv
  $ advcsv project posts.csv --column Title --column Score=score
  $ cat posts.csv | advcsv project --column Title --jsonl"#
)]
struct Cli {
    #[command(flatten)]
    dialect: DialectArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct DialectArgs {
    #[arg(
        long,
        global = true,
        default_value = ",",
        value_parser = parse_byte,
        help = "Cell delimiter (single ASCII character, or \\t)"
    )]
    delimiter: u8,
    #[arg(
        long,
        global = true,
        default_value = "\"",
        value_parser = parse_byte,
        help = "Quote character for quoted cells"
    )]
    quote: u8,
    #[arg(
        long,
        global = true,
        default_value = "#",
        value_parser = parse_byte,
        help = "Lines starting with this character are skipped"
    )]
    comment: u8,
    #[arg(long, global = true, help = "Do not treat any line as a comment")]
    no_comment: bool,
    #[arg(long, global = true, help = "Allow rows with a different cell count than the header")]
    flexible: bool,
    #[arg(
        long,
        global = true,
        default_value = "first",
        value_enum,
        help = "Which column a repeated header name binds to: first|last"
    )]
    duplicate_headers: DuplicateHeadersCli,
}

impl DialectArgs {
    fn options(&self) -> DecodeOptions {
        let comment = if self.no_comment {
            None
        } else {
            Some(self.comment)
        };
        DecodeOptions::new()
            .with_delimiter(self.delimiter)
            .with_quote(self.quote)
            .with_comment(comment)
            .with_flexible(self.flexible)
            .with_duplicate_headers(match self.duplicate_headers {
                DuplicateHeadersCli::First => DuplicateHeaders::FirstWins,
                DuplicateHeadersCli::Last => DuplicateHeaders::LastWins,
            })
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DuplicateHeadersCli {
    First,
    Last,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the header row as JSON")]
    Headers {
        #[arg(help = "CSV file (default: stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    #[command(about = "Decode named columns of every row into JSON objects")]
    Project {
        #[arg(help = "CSV file (default: stdin)", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        #[arg(
            long = "column",
            short = 'c',
            required = true,
            help = "Column to keep, as NAME or NAME=KEY (repeatable)"
        )]
        columns: Vec<String>,
        #[arg(long, help = "Emit JSON Lines (one object per line)")]
        jsonl: bool,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn parse_byte(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(format!("expected a single ASCII character, got {value:?}"))
            }
        }
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        for cause in error_causes(err) {
            eprintln!("  caused by: {cause}");
        }
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = std::error::Error::source(err);
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert(
        "message".to_string(),
        json!(err.message().unwrap_or("unknown error")),
    );
    if let Some(type_name) = err.type_name() {
        inner.insert("type".to_string(), json!(type_name));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    if let Some(text) = err.text() {
        inner.insert("text".to_string(), json!(text));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}
