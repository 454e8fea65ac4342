//! Timegroup - timesheet grouping CLI
//!
//! Reads timesheet lines (or uses the built-in sample), groups them by
//! day and rate code, and prints or writes the rendered result.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad config, write failure, etc.)
//!   2 - Inconsistent rate code groups found with --strict

use anyhow::{Context, Result};
use std::path::Path;
use timegroup::analysis::{self, find_representative_mismatches};
use timegroup::cli::{Args, OutputFormat};
use timegroup::config::{Config, CONFIG_FILE_NAME};
use timegroup::models::{sample_lines, TimesheetLine};
use timegroup::{input, report, TimegroupError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging so it can turn on verbose output
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("Timegroup v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Effective config: {:?}", config);

    match run(&args, &config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .timegroup.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout is reserved for the rendered output.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load, check, group, render and emit. Returns exit code (0 or 2).
fn run(args: &Args, config: &Config) -> Result<i32> {
    let lines = load_lines(args)?;

    let exit_code = check_consistency(config, &lines);
    if exit_code != 0 {
        return Ok(exit_code);
    }

    let output = render(&lines, config)?;

    match config.general.output {
        Some(ref path) => {
            report::write_report(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(0)
}

/// Apply the configured rate code consistency check.
///
/// Returns 2 when `check.strict` is set and some line disagrees with its
/// rate code's first line, 0 otherwise. Strict mode logs mismatches as
/// errors; otherwise they are warnings when `warn_on_mismatch` is set.
fn check_consistency(config: &Config, lines: &[TimesheetLine]) -> i32 {
    if config.check.strict {
        if let Err(TimegroupError::InconsistentGroups(mismatches)) =
            analysis::ensure_consistent(lines)
        {
            for mismatch in &mismatches {
                error!("Inconsistent rate code group: {}", mismatch);
            }
            eprintln!(
                "\n⛔ {} line(s) disagree with their rate code. Failing (exit code 2).",
                mismatches.len()
            );
            return 2;
        }
    } else if config.check.warn_on_mismatch {
        for mismatch in find_representative_mismatches(lines) {
            warn!("Inconsistent rate code group: {}", mismatch);
        }
    }

    0
}

/// Read the input file, or fall back to the built-in sample.
fn load_lines(args: &Args) -> Result<Vec<TimesheetLine>> {
    match args.input {
        Some(ref path) => {
            info!("Reading timesheet from: {}", path.display());
            input::load_lines(path, args.input_format)
                .with_context(|| format!("Failed to load timesheet from {}", path.display()))
        }
        None => {
            info!("No --input given, using the built-in sample timesheet");
            Ok(sample_lines())
        }
    }
}

/// Render the lines in the configured output format.
fn render(lines: &[TimesheetLine], config: &Config) -> Result<String> {
    let options = config.table_options();

    let output = match config.report.format {
        OutputFormat::Html => {
            let days = analysis::group_by_day_then_rate_code(lines);
            report::render_html_table_with(&days, &options)
        }
        OutputFormat::Document => {
            let days = analysis::group_by_day_then_rate_code(lines);
            report::render_html_document(&days, &options)
        }
        OutputFormat::Json => {
            let days = analysis::group_by_day_then_rate_code(lines);
            report::generate_json_report(&days)?
        }
        OutputFormat::Summary => {
            let groups = analysis::group_by_rate_code(lines);
            report::render_rate_code_summary(&groups)
        }
    };

    Ok(output)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    Ok(Config::load_default()?.unwrap_or_default())
}
