//! File-system storage for the clickstream pipeline.
//!
//! This crate implements the collaborator traits defined in `clickstream-core`:
//! - CSV readers for the events, item properties, and category tree sources
//! - A staged, partition-aware JSON Lines sink with whole-batch commit
//!
//! ```text
//!   raw/*.csv ──► CsvBatchSource ──► BatchPipeline (core) ──► PartitionedFileSink
//!                                                                    │
//!                                   processed/_staging-<run>/ ◄──────┘
//!                                              │ commit
//!                                              ▼
//!                    processed/{enriched_events,latest_properties,category_hierarchy}
//! ```

pub mod errors;
pub mod sink;
pub mod sources;

pub use errors::StorageError;
pub use sink::PartitionedFileSink;
pub use sources::{CsvBatchSource, SourcePaths};

// Re-export from clickstream-core for convenience
pub use clickstream_core::errors::{Error, Result};
