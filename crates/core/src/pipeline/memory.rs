//! In-memory source and sink, for tests and embedding the pipeline without storage.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::categories::{CategoryEdge, CategoryPath};
use crate::constants::{
    CATEGORY_HIERARCHY_DATASET, ENRICHED_EVENTS_DATASET, LATEST_PROPERTIES_DATASET,
};
use crate::errors::SinkError;
use crate::events::{EnrichedEvent, EventPartition, RawEvent};
use crate::properties::{PropertyChange, ResolvedProperty};
use crate::Result;

use super::{BatchSourceTrait, DatasetSinkTrait, EventPartitions};

/// Source backed by owned collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBatchSource {
    pub events: Vec<RawEvent>,
    pub property_changes: Vec<PropertyChange>,
    pub category_edges: Vec<CategoryEdge>,
}

impl InMemoryBatchSource {
    pub fn new(
        events: Vec<RawEvent>,
        property_changes: Vec<PropertyChange>,
        category_edges: Vec<CategoryEdge>,
    ) -> Self {
        Self {
            events,
            property_changes,
            category_edges,
        }
    }
}

impl BatchSourceTrait for InMemoryBatchSource {
    fn read_events(&self) -> Result<Vec<RawEvent>> {
        Ok(self.events.clone())
    }

    fn read_property_changes(&self) -> Result<Vec<PropertyChange>> {
        Ok(self.property_changes.clone())
    }

    fn read_category_edges(&self) -> Result<Vec<CategoryEdge>> {
        Ok(self.category_edges.clone())
    }
}

/// The three datasets as held by [`InMemoryDatasetSink`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDatasets {
    pub enriched_events: BTreeMap<EventPartition, Vec<EnrichedEvent>>,
    pub latest_properties: Vec<ResolvedProperty>,
    pub category_hierarchy: Vec<CategoryPath>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    staged: MemoryDatasets,
    published: Option<MemoryDatasets>,
    aborted: bool,
    fail_dataset: Option<&'static str>,
}

/// Sink that stages datasets in memory and publishes them on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatasetSink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl InMemoryDatasetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose write of `dataset` fails, for exercising the abort path.
    pub fn failing_on(dataset: &'static str) -> Self {
        let sink = Self::default();
        sink.lock().fail_dataset = Some(dataset);
        sink
    }

    /// Datasets published by the last successful commit.
    pub fn published(&self) -> Option<MemoryDatasets> {
        self.lock().published.clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    fn lock(&self) -> MutexGuard<'_, MemorySinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(state: &MemorySinkState, dataset: &'static str) -> Result<()> {
        if state.published.is_some() || state.aborted {
            return Err(SinkError::AlreadyFinished.into());
        }
        if state.fail_dataset == Some(dataset) {
            return Err(SinkError::WriteFailed {
                dataset: dataset.to_string(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl DatasetSinkTrait for InMemoryDatasetSink {
    fn write_enriched_events(&self, partitions: &EventPartitions<'_>) -> Result<()> {
        let mut state = self.lock();
        Self::check_writable(&state, ENRICHED_EVENTS_DATASET)?;
        for (partition, events) in partitions {
            state
                .staged
                .enriched_events
                .entry(*partition)
                .or_default()
                .extend(events.iter().map(|event| (*event).clone()));
        }
        Ok(())
    }

    fn write_latest_properties(&self, properties: &[ResolvedProperty]) -> Result<()> {
        let mut state = self.lock();
        Self::check_writable(&state, LATEST_PROPERTIES_DATASET)?;
        state.staged.latest_properties = properties.to_vec();
        Ok(())
    }

    fn write_category_hierarchy(&self, paths: &[CategoryPath]) -> Result<()> {
        let mut state = self.lock();
        Self::check_writable(&state, CATEGORY_HIERARCHY_DATASET)?;
        state.staged.category_hierarchy = paths.to_vec();
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut state = self.lock();
        if state.published.is_some() || state.aborted {
            return Err(SinkError::AlreadyFinished.into());
        }
        let staged = std::mem::take(&mut state.staged);
        state.published = Some(staged);
        Ok(())
    }

    fn abort(&self) -> Result<()> {
        let mut state = self.lock();
        if state.published.is_some() {
            return Err(SinkError::AlreadyFinished.into());
        }
        state.staged = MemoryDatasets::default();
        state.aborted = true;
        Ok(())
    }
}
