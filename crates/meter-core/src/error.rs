use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`MeterError`], used by callers that branch on
/// the kind of failure rather than its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required column is absent from the header row.
    Schema,
    /// A date or numeric cell does not parse under the required pattern.
    Format,
    /// A numeric value violates a domain constraint (negative quantity).
    Range,
    /// The unit column contains something other than the accepted token.
    Unit,
    /// An aggregate was requested over zero rows.
    EmptySeries,
    /// The input could not be read or decoded, or configuration is invalid.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Format => "FormatError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Unit => "UnitError",
            ErrorKind::EmptySeries => "EmptySeriesError",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}

/// All errors produced by the meter pipeline.
#[derive(Error, Debug)]
pub enum MeterError {
    /// One or more required columns are missing from the header row.
    ///
    /// `required` lists every required column in display order, `missing`
    /// the subset that was not found.
    #[error("CSV must contain these columns: {}. Missing: {}", .required.join(", "), .missing.join(", "))]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    /// A date cell did not match `MM/DD/YYYY`.
    #[error("Invalid date format in {column} at line {line}: {value:?}. Please ensure dates are in MM/DD/YYYY format")]
    InvalidDate {
        column: String,
        line: u64,
        value: String,
    },

    /// A quantity cell is not a finite number.
    #[error("{column} values must be numeric (line {line}: {value:?})")]
    NonNumeric {
        column: String,
        line: u64,
        value: String,
    },

    /// A quantity cell parsed but is below zero.
    #[error("{column} values cannot be negative (line {line}: {value:?})")]
    NegativeQuantity {
        column: String,
        line: u64,
        value: String,
    },

    /// A quantity is finite but too large to express in gallons.
    #[error("{column} value is out of range after conversion to gallons (line {line}: {value:?})")]
    QuantityOutOfRange {
        column: String,
        line: u64,
        value: String,
    },

    /// A unit cell did not match the expected unit token.
    #[error("All units must be in {expected} (line {line}: {value:?})")]
    UnitMismatch {
        expected: String,
        line: u64,
        value: String,
    },

    /// Statistics or trends were requested over an empty series.
    #[error("Cannot analyse an empty usage series")]
    EmptySeries,

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be decoded or encoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MeterError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeterError::MissingColumns { .. } => ErrorKind::Schema,
            MeterError::InvalidDate { .. } | MeterError::NonNumeric { .. } => ErrorKind::Format,
            MeterError::NegativeQuantity { .. } | MeterError::QuantityOutOfRange { .. } => {
                ErrorKind::Range
            }
            MeterError::UnitMismatch { .. } => ErrorKind::Unit,
            MeterError::EmptySeries => ErrorKind::EmptySeries,
            MeterError::FileRead { .. }
            | MeterError::FileWrite { .. }
            | MeterError::Csv(_)
            | MeterError::Config(_)
            | MeterError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the meter crates.
pub type Result<T> = std::result::Result<T, MeterError>;
