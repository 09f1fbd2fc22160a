//! Error types for the data-loader crate.
//!
//! Everything in here is a load-time failure. The loader either produces a
//! fully validated `DataIndex` or one of these, and callers treat all of them
//! as fatal at startup.

use thiserror::Error;

/// Errors that can occur during dataset loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader rejected the file (bad quoting, ragged rows, ...)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Row in a data file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A required field is missing or a record breaks an invariant
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The dataset produced no movies at all
    #[error("Dataset is empty: no movies were loaded")]
    EmptyDataset,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
