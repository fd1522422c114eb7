use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_tools::config::{
    ConsolidateOptions, DEFAULT_HEADER_ROW, DEFAULT_INTAKE_DIR, DEFAULT_KEYWORD,
    DEFAULT_TABLE_PATH,
};
use roster_tools::io::{excel_write, intake};
use roster_tools::lookup::{self, FieldSynonymMap};
use roster_tools::{Result, ToolError, consolidate};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    match cli.command {
        Command::Consolidate(args) => execute_consolidate(args),
        Command::Birthdays(args) => execute_birthdays(args),
        Command::Stage(args) => {
            let staged = intake::stage_workbooks(&args.intake, &args.files)?;
            for path in staged {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Clear(args) => {
            let removed = intake::clear_intake(&args.intake)?;
            println!("{removed} workbook(s) removed");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn execute_consolidate(args: ConsolidateArgs) -> Result<()> {
    let options = ConsolidateOptions {
        keyword: args.keyword,
        header_row: args.header_row,
        ..ConsolidateOptions::new(args.intake, args.output)
    };
    let summary = consolidate::consolidate(&options)?;
    emit(&summary, args.json)
}

fn execute_birthdays(args: BirthdaysArgs) -> Result<()> {
    let response = lookup::find_birthdays(&args.table, &args.date, &FieldSynonymMap::default())?;
    if let Some(path) = &args.export {
        excel_write::write_matches(path, &response.people)?;
    }
    emit(&response, args.json)
}

fn emit<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Consolidate student master workbooks and look up birthdays."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every workbook in the intake directory into the canonical table.
    Consolidate(ConsolidateArgs),
    /// List students whose birthday falls on a date.
    Birthdays(BirthdaysArgs),
    /// Copy workbooks into the intake directory.
    Stage(StageArgs),
    /// Delete every workbook from the intake directory.
    Clear(IntakeArgs),
}

#[derive(clap::Args)]
struct ConsolidateArgs {
    /// Directory holding the uploaded workbooks.
    #[arg(long, env = "ROSTER_INTAKE_DIR", default_value = DEFAULT_INTAKE_DIR)]
    intake: PathBuf,

    /// Canonical table to replace.
    #[arg(long, env = "ROSTER_TABLE", default_value = DEFAULT_TABLE_PATH)]
    output: PathBuf,

    /// Only sheets whose name contains this text are read.
    #[arg(long, default_value = DEFAULT_KEYWORD)]
    keyword: String,

    /// Zero-based row holding the column headers.
    #[arg(long, default_value_t = DEFAULT_HEADER_ROW)]
    header_row: usize,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct BirthdaysArgs {
    /// Date to match, as MM-DD or YYYY-MM-DD.
    #[arg(long)]
    date: String,

    /// Canonical table to search.
    #[arg(long, env = "ROSTER_TABLE", default_value = DEFAULT_TABLE_PATH)]
    table: PathBuf,

    /// Also write the matches to this Excel workbook.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct StageArgs {
    /// Directory the workbooks are copied into.
    #[arg(long, env = "ROSTER_INTAKE_DIR", default_value = DEFAULT_INTAKE_DIR)]
    intake: PathBuf,

    /// Workbooks to copy.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(clap::Args)]
struct IntakeArgs {
    /// Directory whose spreadsheets are deleted.
    #[arg(long, env = "ROSTER_INTAKE_DIR", default_value = DEFAULT_INTAKE_DIR)]
    intake: PathBuf,
}
