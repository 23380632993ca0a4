//! MicroBridge: NDP.view2 annotations to laser microdissection.
//!
//! MicroBridge converts region annotations exported from NDP.view2 (NDPA XML,
//! or the region CSV export) into the LMD XML import format. The first three
//! regions of every file are calibration points; every later region with a
//! point list becomes a cutting shape.
//!
//! # Modules
//!
//! - [`ir`]: Coordinate, region and LMD document types plus the file readers and writer
//! - [`conversion`]: The single-file pipeline, its report and log sinks
//! - [`batch`]: Multi-file conversion with progress, cancellation and optional parallelism
//! - [`preflight`]: Cheap checks run before a batch starts
//! - [`error`]: Error types for microbridge operations

pub mod batch;
pub mod conversion;
pub mod error;
pub mod ir;
pub mod preflight;

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use batch::{BatchOptions, BatchSummary};
use conversion::{
    ConsoleSink, ConversionReport, ConvertOptions, FormatChoice, LogSink, NullSink,
    DEFAULT_OUTPUT_EXTENSION,
};
pub use error::MicroBridgeError;

/// The microbridge CLI application.
#[derive(Parser)]
#[command(name = "microbridge")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert NDPA or CSV files to LMD XML.
    Convert(ConvertArgs),
    /// Run the pre-flight checks without converting anything.
    Check(CheckArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input files, or directories containing .ndpa/.csv files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the output files (default: next to each input).
    #[arg(short = 'o', long, env = "MICROBRIDGE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Input format.
    #[arg(long, value_enum, default_value_t = InputFormatArg::Auto)]
    format: InputFormatArg,

    /// Write (0, 0) for calibration points without coordinates instead of failing.
    #[arg(long, env = "MICROBRIDGE_FORCE")]
    force: bool,

    /// Extension of the output files.
    #[arg(long, default_value = DEFAULT_OUTPUT_EXTENSION)]
    extension: String,

    /// Number of files to convert in parallel.
    #[arg(short = 'j', long, default_value_t = 1, value_parser = parse_jobs)]
    jobs: usize,

    /// Walk subdirectories of directory inputs.
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Skip the pre-flight checks.
    #[arg(long)]
    skip_preflight: bool,

    /// How to print the results.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Arguments for the check subcommand.
#[derive(clap::Args)]
struct CheckArgs {
    /// Input files, or directories containing .ndpa/.csv files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the output files would be written to.
    #[arg(short = 'o', long, env = "MICROBRIDGE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Extension the output files would get.
    #[arg(long, default_value = DEFAULT_OUTPUT_EXTENSION)]
    extension: String,

    /// Walk subdirectories of directory inputs.
    #[arg(short = 'r', long)]
    recursive: bool,
}

/// CLI-facing input format selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormatArg {
    /// Decide from the extension, then the content.
    Auto,
    /// NDP.view2 NDPA XML.
    Ndpa,
    /// NDP.view2 region CSV export.
    Csv,
}

impl From<InputFormatArg> for FormatChoice {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Auto => FormatChoice::Auto,
            InputFormatArg::Ndpa => FormatChoice::Ndpa,
            InputFormatArg::Csv => FormatChoice::Csv,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn parse_jobs(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(jobs) if jobs >= 1 => Ok(jobs),
        _ => Err("JOBS must be a whole number of at least 1".to_string()),
    }
}

/// Run the microbridge CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), MicroBridgeError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Check(args)) => run_check(args),
        None => {
            println!("microbridge {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert NDP.view2 annotations to LMD XML.");
            println!();
            println!("Run 'microbridge --help' for usage information.");
            Ok(())
        }
    }
}

fn run_convert(args: ConvertArgs) -> Result<(), MicroBridgeError> {
    let inputs = batch::discover_inputs(&args.inputs, args.recursive)?;
    if inputs.is_empty() {
        return Err(MicroBridgeError::NoInputFiles);
    }

    if args.force {
        eprintln!(
            "Warning: --force is set. Calibration points without coordinates are written as (0, 0); \
             the LMD system may malfunction if these files are used!"
        );
    }

    let options = BatchOptions {
        convert: ConvertOptions {
            output_dir: args.output_dir,
            output_extension: args.extension,
            allow_missing_calibration: args.force,
            format: args.format.into(),
        },
        jobs: args.jobs,
    };

    if !args.skip_preflight {
        let report = preflight::run_preflight(&inputs, &options.convert);
        if !report.is_clean() {
            eprint!("{report}");
            return report.into_result();
        }
    }

    let sink: &dyn LogSink = match args.report {
        ReportFormat::Text => &ConsoleSink,
        ReportFormat::Json => &NullSink,
    };
    let summary = batch::convert_batch(&inputs, &options, sink, &AtomicBool::new(false));

    if args.report == ReportFormat::Json {
        let json = serde_json::to_string_pretty(&BatchReportJson::from(&summary))
            .map_err(|err| MicroBridgeError::Io(err.into()))?;
        println!("{json}");
    }

    summary.into_result().map(|_| ())
}

fn run_check(args: CheckArgs) -> Result<(), MicroBridgeError> {
    let inputs = batch::discover_inputs(&args.inputs, args.recursive)?;
    if inputs.is_empty() {
        return Err(MicroBridgeError::NoInputFiles);
    }

    let options = ConvertOptions {
        output_dir: args.output_dir,
        output_extension: args.extension,
        ..Default::default()
    };
    let report = preflight::run_preflight(&inputs, &options);
    if report.is_clean() {
        println!("Checked {} file(s).", inputs.len());
        print!("{report}");
    } else {
        eprint!("{report}");
    }
    report.into_result()
}

/// JSON shape of a batch run for `--report json`.
#[derive(Serialize)]
struct BatchReportJson<'a> {
    total: usize,
    successful: usize,
    failed: usize,
    cancelled: bool,
    files: Vec<FileReportJson<'a>>,
}

#[derive(Serialize)]
struct FileReportJson<'a> {
    input: &'a Path,
    success: bool,
    output: Option<&'a Path>,
    error: Option<String>,
    report: &'a ConversionReport,
}

impl<'a> From<&'a BatchSummary> for BatchReportJson<'a> {
    fn from(summary: &'a BatchSummary) -> Self {
        Self {
            total: summary.total,
            successful: summary.successful(),
            failed: summary.failed(),
            cancelled: summary.cancelled,
            files: summary
                .results
                .iter()
                .map(|outcome| FileReportJson {
                    input: &outcome.input,
                    success: outcome.result.success,
                    output: outcome.result.output_path.as_deref(),
                    error: outcome.result.error.as_ref().map(ToString::to_string),
                    report: &outcome.result.report,
                })
                .collect(),
        }
    }
}
