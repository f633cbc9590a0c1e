use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use payterms_tools::accounting::{CommandBridge, InMemoryLedger};
use payterms_tools::import::{self, ImportReport, ImportRequest};
use payterms_tools::io::excel_read::DEFAULT_SHEET;
use payterms_tools::io::excel_write;
use payterms_tools::{ErrorCategory, Result, ToolError};
use tracing_subscriber::EnvFilter;

/// Exit status for runs that finished but left rows or records behind.
const EXIT_INCOMPLETE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error}");
            for hint in hints(&error) {
                eprintln!("  - {hint}");
            }
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Inspect(args) => execute_inspect(args),
        Command::Import(args) => execute_import(args),
        Command::Template(args) => execute_template(args),
    }
}

fn execute_inspect(args: InspectArgs) -> Result<i32> {
    let request = args.source.request();
    let extraction = import::preview(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(0);
    }

    println!(
        "Found {} payment terms to import:",
        extraction.records.len()
    );
    for term in &extraction.records {
        println!("  - {} ({} days)", term.name, term.discount_days);
    }
    if !extraction.row_errors.is_empty() {
        println!("Skipped {} rows:", extraction.row_errors.len());
        for error in &extraction.row_errors {
            println!("  row {}: {}", error.sheet_row, error.reason);
        }
    }
    Ok(0)
}

fn execute_import(args: ImportArgs) -> Result<i32> {
    let request = args.source.request();

    let report = match &args.bridge {
        Some(program) if !args.dry_run => {
            let mut bridge = CommandBridge::new(program.clone(), args.bridge_args.clone());
            import::run_import(&request, &mut bridge)?
        }
        _ => {
            let mut ledger = InMemoryLedger::new();
            import::run_import(&request, &mut ledger)?
        }
    };

    render_report(&report, args.json)?;

    if report.submission.is_none() {
        return Err(ToolError::NothingToImport(report.input));
    }
    Ok(if report.is_clean() { 0 } else { EXIT_INCOMPLETE })
}

fn execute_template(args: TemplateArgs) -> Result<i32> {
    excel_write::write_template(&args.output, &args.sheet)?;
    println!("Template written to {}", args.output.display());
    Ok(0)
}

fn render_report(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn hints(error: &ToolError) -> &'static [&'static str] {
    match error.category() {
        ErrorCategory::File => &["Check that the selected file exists and is an .xlsx workbook"],
        ErrorCategory::Format => &[
            "The workbook needs a 'payment_terms' sheet (or the one passed with --sheet)",
            "Column A holds the term name and column B the discount days, with a header on row 1",
        ],
        ErrorCategory::Connection => &[
            "The accounting application is running and a company file is open",
            "The application allows external applications to access its data",
            "You have appropriate permissions in the accounting application",
        ],
        ErrorCategory::Other => &[],
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Import payment terms from an Excel workbook into a desktop accounting application."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the payment terms a workbook would import.
    Inspect(InspectArgs),
    /// Read a workbook and upsert its payment terms.
    Import(ImportArgs),
    /// Write an empty workbook with the expected layout.
    Template(TemplateArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Input workbook path.
    #[arg(long)]
    input: PathBuf,

    /// Sheet holding the payment terms.
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,
}

impl SourceArgs {
    fn request(&self) -> ImportRequest {
        ImportRequest::new(&self.input).with_sheet(&self.sheet)
    }
}

#[derive(clap::Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the extraction result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ImportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Bridge program that owns the accounting application binding.
    #[arg(long, required_unless_present = "dry_run")]
    bridge: Option<OsString>,

    /// Extra argument passed to the bridge program. Repeatable.
    #[arg(long = "bridge-arg", requires = "bridge", allow_hyphen_values = true)]
    bridge_args: Vec<OsString>,

    /// Submit to an in-memory ledger instead of the accounting application.
    #[arg(long, conflicts_with = "bridge")]
    dry_run: bool,

    /// Print the import report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct TemplateArgs {
    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Name of the sheet to create.
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,
}
