//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.timegroup.toml` files.

use crate::cli::{Args, OutputFormat};
use crate::report::{is_valid_date_format, TableOptions, DEFAULT_DATE_FORMAT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".timegroup.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Consistency check settings.
    #[serde(default)]
    pub check: CheckConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output file path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// strftime format for the day column.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Table `border` attribute.
    #[serde(default = "default_table_attribute")]
    pub border: u32,

    /// Table `cellspacing` attribute.
    #[serde(default = "default_table_attribute")]
    pub cellspacing: u32,

    /// Table `cellpadding` attribute.
    #[serde(default = "default_table_attribute")]
    pub cellpadding: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            date_format: default_date_format(),
            border: default_table_attribute(),
            cellspacing: default_table_attribute(),
            cellpadding: default_table_attribute(),
        }
    }
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_table_attribute() -> u32 {
    1
}

/// Rate code consistency check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Fail when lines sharing a rate code disagree.
    #[serde(default)]
    pub strict: bool,

    /// Log a warning for each disagreeing line.
    #[serde(default = "default_true")]
    pub warn_on_mismatch: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            strict: false,
            warn_on_mismatch: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.timegroup.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_date_format(&self.report.date_format) {
            bail!("Invalid date format: {}", self.report.date_format);
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref date_format) = args.date_format {
            self.report.date_format = date_format.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }

        // Flags always override
        if args.strict {
            self.check.strict = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Table presentation settings for the HTML renderers.
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            border: self.report.border,
            cellspacing: self.report.cellspacing,
            cellpadding: self.report.cellpadding,
            date_format: self.report.date_format.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
