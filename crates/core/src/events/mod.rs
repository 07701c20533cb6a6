//! Events module - raw and enriched event models, the enricher, and output partitioning.

mod events_enricher;
mod events_model;
mod partition;

pub use events_enricher::{normalize_event, parse_identifier, EnrichmentOutput, EventEnricher};
pub use events_model::{
    EnrichedEvent, EnrichmentStats, EventType, MalformedFields, MalformedValueCounts,
    NormalizedEvent, RawEvent,
};
pub use partition::{partition_events, EventPartition, NULL_PARTITION_VALUE};


#[cfg(test)]
mod partition_tests;
