//! Error type for the library API.

use crate::models::RepresentativeMismatch;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimegroupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("{} line(s) disagree with their rate code's representative values", .0.len())]
    InconsistentGroups(Vec<RepresentativeMismatch>),
}

pub type Result<T> = std::result::Result<T, TimegroupError>;
