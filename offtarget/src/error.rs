use std::fmt;

use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OffTargetError>;

#[derive(Debug, Error)]
pub enum OffTargetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required columns could not be resolved from the header row.
    #[error("{0}")]
    MissingColumns(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Field of a row that failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Chromosome,
    Position,
    Record,
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RowField::Chromosome => "chromosome",
            RowField::Position => "position",
            RowField::Record => "record",
        };
        write!(f, "{}", s)
    }
}

/// A per-row conversion failure. The row is dropped; ingestion continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: invalid {field} '{value}': {reason}")]
pub struct RowError {
    /// 1-based data row number (header excluded).
    pub row: usize,
    pub field: RowField,
    pub value: String,
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, field: RowField, value: &str, reason: impl Into<String>) -> Self {
        Self {
            row,
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
