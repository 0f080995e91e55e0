use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrBackendChoice {
    Auto,
    Tesseract,
    Noop,
}

/// Which values actually came from the command line, so file configuration
/// only overrides defaults and never an explicit flag.
#[derive(Debug, Default)]
pub struct CliSources {
    pub ocr_backend_from_cli: bool,
    pub combined_text_from_cli: bool,
    pub source_timeout_from_cli: bool,
    pub pretty_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            ocr_backend_from_cli: value_from_cli(matches, "ocr_backend"),
            combined_text_from_cli: value_from_cli(matches, "combined_text"),
            source_timeout_from_cli: value_from_cli(matches, "source_timeout_ms"),
            pretty_from_cli: value_from_cli(matches, "pretty"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "medscan",
    about = "Read a medication label photo and look the medication up",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Write the scan report JSON to a file instead of stdout
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pretty-print the report JSON
    #[arg(long = "pretty", id = "pretty")]
    pub pretty: bool,

    /// Preferred OCR backend
    #[arg(
        long = "ocr-backend",
        id = "ocr_backend",
        value_enum,
        default_value_t = OcrBackendChoice::Auto
    )]
    pub ocr_backend: OcrBackendChoice,

    /// Extract from the combined text of every variant instead of the best one
    #[arg(long = "combined-text", id = "combined_text")]
    pub combined_text: bool,

    /// Directory for writing the preprocessed variants as image files
    #[arg(long = "dump-dir")]
    pub dump_dir: Option<PathBuf>,

    /// Per-source lookup timeout in milliseconds
    #[arg(
        long = "source-timeout-ms",
        id = "source_timeout_ms",
        default_value_t = 8000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub source_timeout_ms: u64,

    /// Merge priority override, highest first (repeatable)
    #[arg(long = "source-priority", id = "source_priority", value_name = "SOURCE")]
    pub source_priority: Vec<String>,

    /// Input image paths
    #[arg(required = true, value_name = "IMAGE")]
    pub inputs: Vec<PathBuf>,
}
