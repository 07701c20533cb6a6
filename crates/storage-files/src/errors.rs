//! Storage-specific error types.
//!
//! These wrap CSV, I/O, and JSON errors and are converted to the core error
//! types, with the affected dataset attached, before leaving this crate.

use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

use clickstream_core::errors::{Error, SinkError, SourceDataset, SourceError};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Converts a read failure into the structural error of `dataset`.
    pub fn into_source_error(self, dataset: SourceDataset, path: &Path) -> SourceError {
        match self {
            StorageError::Io(e) if e.kind() == ErrorKind::NotFound => SourceError::Missing {
                dataset,
                location: path.display().to_string(),
            },
            StorageError::Csv(e) => match (e.position(), e.kind()) {
                (Some(position), csv::ErrorKind::Deserialize { .. }) => SourceError::MalformedRow {
                    dataset,
                    line: position.line(),
                    reason: e.to_string(),
                },
                _ => SourceError::Unreadable {
                    dataset,
                    reason: e.to_string(),
                },
            },
            other => SourceError::Unreadable {
                dataset,
                reason: other.to_string(),
            },
        }
    }

    /// Converts a write failure into a sink error for `dataset`.
    pub fn into_sink_error(self, dataset: &str) -> SinkError {
        SinkError::WriteFailed {
            dataset: dataset.to_string(),
            reason: self.to_string(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Unexpected(err.to_string())
    }
}

/// Extension for attaching source context to storage results.
pub trait SourceResultExt<T> {
    fn for_source(self, dataset: SourceDataset, path: &Path) -> clickstream_core::Result<T>;
}

impl<T, E: Into<StorageError>> SourceResultExt<T> for std::result::Result<T, E> {
    fn for_source(self, dataset: SourceDataset, path: &Path) -> clickstream_core::Result<T> {
        self.map_err(|e| Error::Source(e.into().into_source_error(dataset, path)))
    }
}

/// Extension for attaching sink context to storage results.
pub trait SinkResultExt<T> {
    fn for_dataset(self, dataset: &str) -> clickstream_core::Result<T>;
}

impl<T, E: Into<StorageError>> SinkResultExt<T> for std::result::Result<T, E> {
    fn for_dataset(self, dataset: &str) -> clickstream_core::Result<T> {
        self.map_err(|e| Error::Sink(e.into().into_sink_error(dataset)))
    }
}
