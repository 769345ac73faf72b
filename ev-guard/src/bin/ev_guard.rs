//! ev-guard command line
//!
//! Validates the dataset, builds derived views and writes the checksum
//! manifest. Exits with status 1 on any fatal error.

use clap::{Args, Parser, Subcommand};
use ev_guard::checksums::{self, DEFAULT_INCLUDE, DEFAULT_OUTPUT};
use ev_guard::config::{DatasetLayout, ValidationConfig};
use ev_guard::core::{ConsoleReporter, Marker, Reporter, SeverityMode};
use ev_guard::error::Result;
use ev_guard::logging::setup::{init_logging, LoggingConfig};
use ev_guard::stations::validate_dataset;
use ev_guard::views::ViewBuilder;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level for ev-guard diagnostics on stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    /// Emit diagnostics as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the dataset against the stations contract
    Validate(ValidateArgs),
    /// Build derived CSV views from the stations table
    BuildViews(BuildViewsArgs),
    /// Write SHA-256 checksums for dataset files
    Checksums(ChecksumsArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Directory containing the raw CSV files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Fail on the first violation instead of warning
    #[arg(long)]
    strict: bool,

    /// JSON file overriding the dataset layout
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the validation report as JSON to this path
    #[arg(long)]
    report_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BuildViewsArgs {
    /// Directory containing the raw CSV files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Output directory for generated CSV files
    #[arg(long, default_value = "generated")]
    out_dir: PathBuf,

    /// JSON file overriding the dataset layout
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ChecksumsArgs {
    /// Repository root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output checksums file, relative to the root
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Glob patterns relative to the root
    #[arg(long, num_args = 1.., default_values_t = DEFAULT_INCLUDE.map(String::from))]
    include: Vec<String>,
}

fn load_layout(path: Option<&PathBuf>) -> Result<DatasetLayout> {
    match path {
        Some(path) => DatasetLayout::from_json_file(path),
        None => Ok(DatasetLayout::default()),
    }
}

fn validate(args: ValidateArgs, reporter: &mut dyn Reporter) -> Result<()> {
    let config = ValidationConfig::new(SeverityMode::from_strict_flag(args.strict))
        .with_layout(load_layout(args.config.as_ref())?);

    let report = validate_dataset(&args.data_dir, &config, reporter)?;
    if let Some(path) = args.report_json {
        std::fs::write(&path, report.to_json_pretty()?)?;
    }
    reporter.emit(Marker::Success, &report.summary());
    Ok(())
}

fn build_views(args: BuildViewsArgs, reporter: &mut dyn Reporter) -> Result<()> {
    let layout = load_layout(args.config.as_ref())?;
    ViewBuilder::new(layout).build(&args.data_dir, &args.out_dir, reporter)?;
    Ok(())
}

fn write_checksums(args: ChecksumsArgs, reporter: &mut dyn Reporter) -> Result<()> {
    let root = args.root.canonicalize()?;
    let out = root.join(&args.out);
    checksums::write_checksums(&root, &out, &args.include, reporter)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_guard_level(cli.log_level)
        .with_json_format(cli.log_json);
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut reporter = ConsoleReporter;
    let outcome = match cli.command {
        Command::Validate(args) => validate(args, &mut reporter),
        Command::BuildViews(args) => build_views(args, &mut reporter),
        Command::Checksums(args) => write_checksums(args, &mut reporter),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.emit(Marker::Failure, &e.to_string());
            ExitCode::from(1)
        }
    }
}
