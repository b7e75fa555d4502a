//! Error types for statement ingestion

use thiserror::Error;

/// Errors that abort reading a whole statement
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not detect statement format. Headers: {headers:?}")]
    UndetectableFormat { headers: Vec<String> },

    #[error("Unknown format '{name}' (known: {known})")]
    UnknownFormat { name: String, known: String },
}

/// Errors for a single row; the reader skips the row and keeps going
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing value for column '{0}'")]
    MissingColumn(String),

    #[error("invalid amount '{value}' in column '{column}'")]
    InvalidAmount { column: String, value: String },
}
