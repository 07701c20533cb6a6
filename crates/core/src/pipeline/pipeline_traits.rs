//! Collaborator interfaces at the batch boundary.
//!
//! Readers hand the pipeline whole, immutable source collections; sinks receive
//! the three output datasets and publish them all-or-nothing.

use std::collections::BTreeMap;

use crate::categories::{CategoryEdge, CategoryPath};
use crate::events::{EnrichedEvent, EventPartition, RawEvent};
use crate::properties::{PropertyChange, ResolvedProperty};
use crate::Result;

/// Enriched events grouped by output partition.
pub type EventPartitions<'a> = BTreeMap<EventPartition, Vec<&'a EnrichedEvent>>;

/// Source of the three input tables.
///
/// Any `Err` is a structural failure and aborts the batch before anything is
/// written.
pub trait BatchSourceTrait: Send + Sync {
    fn read_events(&self) -> Result<Vec<RawEvent>>;

    fn read_property_changes(&self) -> Result<Vec<PropertyChange>>;

    fn read_category_edges(&self) -> Result<Vec<CategoryEdge>>;
}

/// Partition-aware sink for the three output datasets.
///
/// Writes are staged; nothing is visible to readers of the output until
/// `commit` succeeds. After `abort` the staged data is discarded.
pub trait DatasetSinkTrait: Send + Sync {
    /// Writes every partition of `enriched_events`.
    fn write_enriched_events(&self, partitions: &EventPartitions<'_>) -> Result<()>;

    /// Writes the unpartitioned `latest_properties` dataset.
    fn write_latest_properties(&self, properties: &[ResolvedProperty]) -> Result<()>;

    /// Writes the unpartitioned `category_hierarchy` dataset.
    fn write_category_hierarchy(&self, paths: &[CategoryPath]) -> Result<()>;

    /// Publishes everything written since the sink was opened.
    fn commit(&self) -> Result<()>;

    /// Discards everything written since the sink was opened.
    fn abort(&self) -> Result<()>;
}
