//! Output partition keys for the enriched event dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::utils::time_utils::format_event_date;

use super::{EnrichedEvent, EventType};

/// Directory value used when a partition column is null.
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// Physical grouping of enriched events: `(event_type, event_date)`.
///
/// Not part of a record's identity; the same columns stay on the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPartition {
    pub event_type: EventType,
    pub event_date: Option<NaiveDate>,
}

impl EventPartition {
    pub fn of(event: &EnrichedEvent) -> Self {
        Self {
            event_type: event.event_type,
            event_date: event.event_date,
        }
    }

    pub fn event_date_value(&self) -> String {
        self.event_date
            .map(format_event_date)
            .unwrap_or_else(|| NULL_PARTITION_VALUE.to_string())
    }

    /// Hive-style relative directory, e.g. `event_type=view/event_date=2015-06-02`.
    pub fn relative_dir(&self) -> String {
        format!(
            "event_type={}/event_date={}",
            self.event_type.as_str(),
            self.event_date_value()
        )
    }
}

impl fmt::Display for EventPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative_dir())
    }
}

/// Groups events by partition, in partition key order.
///
/// Events keep their input order within a partition.
pub fn partition_events(events: &[EnrichedEvent]) -> BTreeMap<EventPartition, Vec<&EnrichedEvent>> {
    let mut partitions: BTreeMap<EventPartition, Vec<&EnrichedEvent>> = BTreeMap::new();
    for event in events {
        partitions
            .entry(EventPartition::of(event))
            .or_default()
            .push(event);
    }
    partitions
}
