//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use crate::input::InputFormat;
use crate::report::is_valid_date_format;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Timegroup - group timesheet lines by day and rate code
///
/// Totals timesheet volumes per rate code and renders the result as an
/// HTML table, a Markdown summary, or JSON. Without --input the built-in
/// sample timesheet is used.
///
/// Examples:
///   timegroup
///   timegroup --input week.csv --output week.htm --format document
///   timegroup --input week.json --format summary
///   timegroup --input week.csv --strict
///   timegroup --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Timesheet file to read (.json or .csv)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Input format, overriding the file extension
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,

    /// Output format (html, document, json, summary)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .timegroup.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// strftime format for the day column
    ///
    /// Example: --date-format "%Y-%m-%d"
    #[arg(long, value_name = "FORMAT", env = "TIMEGROUP_DATE_FORMAT")]
    pub date_format: Option<String>,

    /// Fail if lines sharing a rate code disagree on description or rate
    ///
    /// Exit code 2 when an inconsistent group is found.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .timegroup.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the rendered result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML table, grouped by day then rate code (default)
    #[default]
    Html,
    /// Standalone HTML page containing the table
    Document,
    /// JSON of the day/rate code grouping
    Json,
    /// Markdown totals per rate code
    Summary,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Input path is not a file: {}", input.display()));
            }
        }

        if let Some(ref date_format) = self.date_format {
            if !is_valid_date_format(date_format) {
                return Err(format!("Invalid date format: {}", date_format));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
