//! Batch outputs and the run summary.

use serde::{Deserialize, Serialize};

use crate::categories::CategoryHierarchy;
use crate::events::{EnrichmentOutput, EnrichmentStats};
use crate::properties::PropertySnapshot;

/// The three datasets produced by one transform, before publishing.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub properties: PropertySnapshot,
    pub hierarchy: CategoryHierarchy,
    pub enriched: EnrichmentOutput,
}

/// Counters reported after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub property_changes_read: usize,
    pub category_edges_read: usize,
    pub latest_properties: usize,
    pub items_with_attributes: usize,
    pub malformed_numeric_values: usize,
    pub category_paths: usize,
    pub duplicate_categories: usize,
    pub enrichment: EnrichmentStats,
    /// Relative directories of the enriched event partitions, in key order.
    pub partitions: Vec<String>,
}
