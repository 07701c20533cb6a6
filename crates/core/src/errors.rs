//! Core error types for the clickstream pipeline.
//!
//! This module defines storage-agnostic error types. Backend-specific errors
//! (CSV decoding, file-system I/O, JSON encoding) are converted to these types
//! by the storage layer.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for a batch run.
///
/// Only structural failures surface here. Malformed values inside otherwise
/// readable rows are recovered where they occur and never become an `Error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// The three tabular inputs of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDataset {
    Events,
    ItemProperties,
    CategoryTree,
}

impl SourceDataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceDataset::Events => "events",
            SourceDataset::ItemProperties => "item_properties",
            SourceDataset::CategoryTree => "category_tree",
        }
    }
}

impl fmt::Display for SourceDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural failure of one input source. Always fatal for the batch.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source table does not exist.
    #[error("{dataset}: source not found at {location}")]
    Missing {
        dataset: SourceDataset,
        location: String,
    },

    /// A required column is absent from the source header.
    #[error("{dataset}: required column '{column}' is missing")]
    MissingColumn {
        dataset: SourceDataset,
        column: String,
    },

    /// The source exists but could not be read.
    #[error("{dataset}: source is unreadable: {reason}")]
    Unreadable {
        dataset: SourceDataset,
        reason: String,
    },

    /// A row could not be decoded into the consumed schema.
    #[error("{dataset}: malformed row at line {line}: {reason}")]
    MalformedRow {
        dataset: SourceDataset,
        line: u64,
        reason: String,
    },
}

/// Failure while writing or publishing output datasets.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write dataset '{dataset}': {reason}")]
    WriteFailed { dataset: String, reason: String },

    #[error("Failed to commit batch: {0}")]
    CommitFailed(String),

    #[error("Failed to abort batch: {0}")]
    AbortFailed(String),

    #[error("Batch already finished")]
    AlreadyFinished,
}

/// Errors from the strict value parsers.
///
/// The batch path uses the lenient parsers, which map these to an absent
/// field instead of returning them.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Failed to parse integer: {0}")]
    IntegerParse(#[from] ParseIntError),

    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Value '{0}' is not a finite number")]
    NonFiniteNumber(String),

    #[error("Value '{0}' has no numeric prefix")]
    MissingNumericPrefix(String),

    #[error("Timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),

    #[error("Unknown event type '{0}'")]
    UnknownEventType(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
