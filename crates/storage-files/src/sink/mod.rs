//! Staged, partition-aware dataset sink.

mod jsonl;
mod partitioned_sink;

#[cfg(test)]
mod partitioned_sink_tests;

pub use jsonl::{write_json_lines, PART_FILE_NAME};
pub use partitioned_sink::{PartitionedFileSink, STAGING_DIR_PREFIX};
