//! Timegroup - timesheet grouping and aggregation.
//!
//! Groups timesheet lines by rate code, or by day and then rate code,
//! summing volumes as exact decimals, and renders the nested result as
//! an HTML table whose day cells span their rate code rows.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod report;

pub use analysis::{group_by_day_then_rate_code, group_by_rate_code};
pub use error::{Result, TimegroupError};
pub use models::{DayGroup, GroupResult, TimesheetLine};
pub use report::render_day_groups_as_html_table;
