//! Error type shared by the fetcher and the store.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::Lake;

/// Errors produced while fetching or persisting lake levels
#[derive(Debug, Error)]
pub enum LakeLevelsError {
    /// Caller passed an unusable argument (e.g. `end` without `start`)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Upstream series had a different number of timestamps and values
    #[error("{lake}: {times} timestamps but {values} values")]
    LengthMismatch {
        lake: String,
        times: usize,
        values: usize,
    },

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed RDB response: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no elevation datum reported for {0}")]
    MissingDatum(Lake),

    /// A row with this timestamp is already stored
    #[error("timestamp {0} is already stored")]
    UniquenessViolation(DateTime<Utc>),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LakeLevelsError>;
