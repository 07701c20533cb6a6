//! Full-batch recomputation of the three output datasets.

use log::{debug, error, info};
use std::sync::Arc;

use crate::categories::{CategoryEdge, HierarchyPathResolver};
use crate::events::{partition_events, EventEnricher, RawEvent};
use crate::properties::{PropertyChange, PropertySnapshotResolver};
use crate::Result;

use super::{BatchOutput, BatchSourceTrait, BatchSummary, DatasetSinkTrait, EventPartitions};

/// Reads the sources, runs the transform, and publishes the result as one unit.
pub struct BatchPipeline {
    source: Arc<dyn BatchSourceTrait>,
    sink: Arc<dyn DatasetSinkTrait>,
    property_resolver: PropertySnapshotResolver,
    hierarchy_resolver: HierarchyPathResolver,
}

impl BatchPipeline {
    pub fn new(source: Arc<dyn BatchSourceTrait>, sink: Arc<dyn DatasetSinkTrait>) -> Self {
        Self {
            source,
            sink,
            property_resolver: PropertySnapshotResolver::new(),
            hierarchy_resolver: HierarchyPathResolver::new(),
        }
    }

    /// Runs one batch end to end.
    ///
    /// A failed read returns before anything is written. A failed write aborts
    /// the sink so that no partial output is published.
    pub fn run(&self) -> Result<BatchSummary> {
        debug!("Reading batch sources");
        let events = self.source.read_events()?;
        let changes = self.source.read_property_changes()?;
        let edges = self.source.read_category_edges()?;
        info!(
            "Read {} events, {} property changes, {} category rows",
            events.len(),
            changes.len(),
            edges.len()
        );

        let property_changes_read = changes.len();
        let category_edges_read = edges.len();
        let output = self.transform(&events, changes, &edges);
        let partitions = partition_events(&output.enriched.events);

        let summary = summarize(&output, &partitions, property_changes_read, category_edges_read);

        if let Err(err) = self.publish(&output, &partitions) {
            error!("Publishing batch failed, discarding staged output: {}", err);
            if let Err(abort_err) = self.sink.abort() {
                error!("Failed to discard staged output: {}", abort_err);
            }
            return Err(err);
        }

        info!(
            "Published {} enriched events in {} partitions, {} latest properties, {} category paths",
            summary.enrichment.events_retained,
            summary.partitions.len(),
            summary.latest_properties,
            summary.category_paths
        );
        Ok(summary)
    }

    /// Pure transform over already-read inputs.
    ///
    /// The two resolvers are independent and run concurrently; the enricher
    /// needs both of their outputs.
    pub fn transform(
        &self,
        events: &[RawEvent],
        changes: Vec<PropertyChange>,
        edges: &[CategoryEdge],
    ) -> BatchOutput {
        let (properties, hierarchy) = rayon::join(
            || self.property_resolver.resolve(changes),
            || self.hierarchy_resolver.resolve(edges),
        );
        debug!(
            "Resolved {} latest properties and {} category paths",
            properties.latest.len(),
            hierarchy.paths.len()
        );

        let path_index = hierarchy.index();
        let enriched = EventEnricher::new(&properties.attributes, &path_index).enrich(events);

        BatchOutput {
            properties,
            hierarchy,
            enriched,
        }
    }

    fn publish(&self, output: &BatchOutput, partitions: &EventPartitions<'_>) -> Result<()> {
        self.sink.write_enriched_events(partitions)?;
        self.sink.write_latest_properties(&output.properties.latest)?;
        self.sink.write_category_hierarchy(&output.hierarchy.paths)?;
        self.sink.commit()
    }
}

fn summarize(
    output: &BatchOutput,
    partitions: &EventPartitions<'_>,
    property_changes_read: usize,
    category_edges_read: usize,
) -> BatchSummary {
    BatchSummary {
        property_changes_read,
        category_edges_read,
        latest_properties: output.properties.latest.len(),
        items_with_attributes: output.properties.attributes.len(),
        malformed_numeric_values: output.properties.malformed_numeric_values,
        category_paths: output.hierarchy.paths.len(),
        duplicate_categories: output.hierarchy.duplicate_categories,
        enrichment: output.enriched.stats,
        partitions: partitions
            .keys()
            .map(|partition| partition.relative_dir())
            .collect(),
    }
}
