//! Data models for timesheet grouping.
//!
//! This module contains the input record and the computed group
//! structures produced by the aggregator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single timesheet line: a volume booked against a rate on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetLine {
    /// Calendar day the volume was booked on.
    pub day: NaiveDate,
    /// Short rate identifier (e.g. "ST", "OV").
    pub rate_code: String,
    /// Human-readable label for the rate code.
    pub rate_description: String,
    /// Monetary unit amount.
    pub rate: Decimal,
    /// Quantity booked.
    pub volume: Decimal,
}

impl TimesheetLine {
    /// Creates a new timesheet line.
    pub fn new(
        day: NaiveDate,
        rate_code: impl Into<String>,
        rate_description: impl Into<String>,
        rate: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            day,
            rate_code: rate_code.into(),
            rate_description: rate_description.into(),
            rate,
            volume,
        }
    }
}

/// Totals for one rate code.
///
/// `rate_description` and `rate` come from the first line seen for the
/// rate code, not from the group as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResult {
    /// The rate code this group was keyed on.
    pub rate_code: String,
    /// Exact sum of `volume` across the group.
    pub total_volume: Decimal,
    /// Description of the first line in the group.
    pub rate_description: String,
    /// Rate of the first line in the group.
    pub rate: Decimal,
}

/// Rate code groups for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    /// The day this group was keyed on.
    pub day: NaiveDate,
    /// Rate code groups in first-seen order within the day.
    pub lines: Vec<GroupResult>,
}

impl DayGroup {
    /// Exact sum of volume across all rate codes in the day.
    pub fn total_volume(&self) -> Decimal {
        self.lines.iter().map(|g| g.total_volume).sum()
    }
}

/// Which field of a line disagreed with its group's representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchField {
    RateDescription,
    Rate,
}

impl fmt::Display for MismatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchField::RateDescription => write!(f, "rate description"),
            MismatchField::Rate => write!(f, "rate"),
        }
    }
}

/// A line whose description or rate differs from the value picked as
/// representative for its rate code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeMismatch {
    /// Rate code of the inconsistent group.
    pub rate_code: String,
    /// Position of the offending line in the input.
    pub line_index: usize,
    /// Field that differs.
    pub field: MismatchField,
    /// Representative value (first seen).
    pub expected: String,
    /// Value found on the offending line.
    pub found: String,
}

impl fmt::Display for RepresentativeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} ({}): {} is '{}' but the group uses '{}'",
            self.line_index, self.rate_code, self.field, self.found, self.expected
        )
    }
}

fn sample_day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, day).expect("sample dates are valid")
}

/// The built-in sample timesheet: two days, two rate codes.
pub fn sample_lines() -> Vec<TimesheetLine> {
    let jan_1 = sample_day(1);
    let jan_2 = sample_day(2);

    vec![
        TimesheetLine::new(
            jan_1,
            "ST",
            "Standard Rate",
            Decimal::new(2100, 2),
            Decimal::new(202, 1),
        ),
        TimesheetLine::new(
            jan_1,
            "ST",
            "Standard Rate",
            Decimal::new(2100, 2),
            Decimal::new(101, 1),
        ),
        TimesheetLine::new(
            jan_2,
            "ST",
            "Standard Rate",
            Decimal::new(2100, 2),
            Decimal::new(202, 1),
        ),
        TimesheetLine::new(
            jan_2,
            "OV",
            "Overtime Rate",
            Decimal::new(3100, 2),
            Decimal::new(3099, 2),
        ),
    ]
}
