//! HTML, Markdown and JSON report generation.
//!
//! This module renders grouped timesheet results. The HTML table shows
//! one row per (day, rate code) with the day cell spanning its rows.

use crate::error::Result;
use crate::models::{DayGroup, GroupResult};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Long date format, e.g. "Tuesday, 01 January 2019".
pub const DEFAULT_DATE_FORMAT: &str = "%A, %d %B %Y";

/// Column labels of the day/rate code table, in order.
pub const COLUMN_LABELS: [&str; 5] = ["Day", "Rate Code", "Rate Description", "Rate", "Volume"];

/// Presentation settings for the HTML table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// `border` attribute of the table.
    pub border: u32,
    /// `cellspacing` attribute of the table.
    pub cellspacing: u32,
    /// `cellpadding` attribute of the table.
    pub cellpadding: u32,
    /// strftime format for the day cell.
    pub date_format: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            border: 1,
            cellspacing: 1,
            cellpadding: 1,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Render day groups as an HTML table with the default options.
///
/// Rate codes and descriptions are written as-is, without HTML escaping.
pub fn render_day_groups_as_html_table(days: &[DayGroup]) -> String {
    render_html_table_with(days, &TableOptions::default())
}

/// Render day groups as an HTML table.
pub fn render_html_table_with(days: &[DayGroup], options: &TableOptions) -> String {
    let mut html = String::new();

    // Header
    html.push_str(&format!(
        "<table border=\"{}\" cellspacing=\"{}\" cellpadding=\"{}\">",
        options.border, options.cellspacing, options.cellpadding
    ));
    html.push_str("<thead>\n");
    for label in COLUMN_LABELS {
        html.push_str(&format!("<th>{}</th>\n", label));
    }
    html.push_str("</thead>\n");
    html.push_str("<tbody>\n");

    for day in days {
        html.push_str(&generate_day_rows(day, &options.date_format));
    }

    html.push_str("</tbody></table>\n");

    html
}

/// Generate the body rows for one day.
fn generate_day_rows(day: &DayGroup, date_format: &str) -> String {
    let mut rows = String::new();

    for (index, line) in day.lines.iter().enumerate() {
        rows.push_str("<tr>\n");

        // Only the first row carries the day; it spans the rest.
        if index == 0 {
            rows.push_str(&format!(
                "<td style=\"vertical-align:top\" rowspan=\"{}\">{}</td>\n",
                day.lines.len(),
                format_long_date(day.day, date_format)
            ));
        }

        rows.push_str(&format!("<td>{}</td>\n", line.rate_code));
        rows.push_str(&format!("<td>{}</td>\n", line.rate_description));
        rows.push_str(&format!("<td>{}</td>\n", format_decimal_n2(line.rate)));
        rows.push_str(&format!("<td>{}</td>\n", format_decimal_n2(line.total_volume)));

        rows.push_str("</tr>\n");
    }

    rows
}

/// Render day groups as a standalone HTML page.
pub fn render_html_document(days: &[DayGroup], options: &TableOptions) -> String {
    let mut document = String::new();

    document.push_str("<!DOCTYPE html>\n");
    document.push_str("<html>\n<head>\n");
    document.push_str("<meta charset=\"utf-8\">\n");
    document.push_str("<title>Timesheet</title>\n");
    document.push_str("</head>\n<body>\n");
    document.push_str(&render_html_table_with(days, options));
    document.push_str("</body>\n</html>\n");

    document
}

/// Render single-level rate code groups as a Markdown table with a total row.
pub fn render_rate_code_summary(groups: &[GroupResult]) -> String {
    let mut section = String::new();

    section.push_str("| Rate Code | Rate Description | Rate | Volume |\n");
    section.push_str("|:---|:---|---:|---:|\n");

    for group in groups {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            group.rate_code,
            group.rate_description,
            format_decimal_n2(group.rate),
            format_decimal_n2(group.total_volume)
        ));
    }

    let total: Decimal = groups.iter().map(|g| g.total_volume).sum();
    section.push_str(&format!(
        "| **Total** | | | **{}** |\n",
        format_decimal_n2(total)
    ));

    section
}

/// Generate a JSON report of the nested grouping.
pub fn generate_json_report(days: &[DayGroup]) -> Result<String> {
    serde_json::to_string_pretty(days).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Format a decimal with two places and `,` thousands separators.
///
/// Midpoints round away from zero: `2.345` becomes `2.35`.
pub fn format_decimal_n2(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let digits = rounded.abs().to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}{}.{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Format a day with a strftime pattern.
///
/// Falls back to [`DEFAULT_DATE_FORMAT`] when the pattern is invalid.
pub fn format_long_date(day: NaiveDate, format: &str) -> String {
    let mut out = String::new();

    if write!(out, "{}", day.format(format)).is_err() {
        out.clear();
        out.push_str(&day.format(DEFAULT_DATE_FORMAT).to_string());
    }

    out
}

/// Returns true if the pattern can format a calendar date.
///
/// Time and zone specifiers (`%H`, `%s`, `%Z`) parse but have nothing to
/// read from a date, so they are rejected along with unknown ones.
pub fn is_valid_date_format(format: &str) -> bool {
    let mut out = String::new();
    write!(out, "{}", NaiveDate::MIN.format(format)).is_ok()
}
