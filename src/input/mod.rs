//! Timesheet input loading.
//!
//! Lines can be read from a JSON array or from a CSV file with the
//! header `day,rate_code,rate_description,rate,volume`.

use crate::error::{Result, TimegroupError};
use crate::models::TimesheetLine;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// JSON array of timesheet lines
    Json,
    /// CSV with a header row
    Csv,
}

impl InputFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            _ => Err(TimegroupError::UnsupportedFormat(format!(
                "cannot infer format of {}; use .json or .csv",
                path.display()
            ))),
        }
    }
}

#[derive(Deserialize)]
struct CsvRow {
    day: String,
    rate_code: String,
    rate_description: String,
    rate: String,
    volume: String,
}

/// Load timesheet lines from a file.
///
/// When `format` is `None` it is inferred from the file extension.
pub fn load_lines(path: &Path, format: Option<InputFormat>) -> Result<Vec<TimesheetLine>> {
    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(path)?,
    };

    debug!("Loading {:?} input from {}", format, path.display());
    let reader = BufReader::new(File::open(path)?);

    let lines = match format {
        InputFormat::Json => read_json(reader)?,
        InputFormat::Csv => read_csv(reader)?,
    };

    debug!("Loaded {} timesheet lines", lines.len());
    Ok(lines)
}

/// Read a JSON array of timesheet lines.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<TimesheetLine>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read timesheet lines from CSV.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TimesheetLine>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut lines = Vec::new();

    for (index, rec) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = rec?;
        let row_number = index + 1;

        lines.push(TimesheetLine {
            day: NaiveDate::parse_from_str(&row.day, DATE_FORMAT)
                .map_err(|e| TimegroupError::Parse(format!("row {row_number} day: {e}")))?,
            rate: parse_decimal(&row.rate, row_number, "rate")?,
            volume: parse_decimal(&row.volume, row_number, "volume")?,
            rate_code: row.rate_code,
            rate_description: row.rate_description,
        });
    }

    Ok(lines)
}

fn parse_decimal(value: &str, row_number: usize, field: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| TimegroupError::Parse(format!("row {row_number} {field}: {e}")))
}
