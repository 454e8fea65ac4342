//! Grouping and aggregation of timesheet lines.

pub mod aggregator;

pub use aggregator::*;
