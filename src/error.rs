//! Error types for fixture loading, filtering and exports.

use std::io;
use thiserror::Error;

/// Rejected filter input. The filter keeps its previous value when this is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter field `{0}`")]
    UnknownField(String),
    #[error("invalid value `{value}` for filter `{field}`")]
    InvalidValue { field: String, value: String },
    #[error("invalid date `{value}` for filter `{field}` (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },
}

/// A fixture that could not be read or that breaks a record invariant.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read fixture file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} {id}: {reason}")]
    Invalid {
        kind: &'static str,
        id: String,
        reason: String,
    },
}

/// Umbrella error for the binary and for exports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("write error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
