//! Domain models for the visitor event stream.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Event types kept in the enriched dataset. Anything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    View,
    AddToCart,
    Transaction,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "view",
            EventType::AddToCart => "addtocart",
            EventType::Transaction => "transaction",
        }
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EventType::View),
            "addtocart" => Ok(EventType::AddToCart),
            "transaction" => Ok(EventType::Transaction),
            other => Err(ValidationError::UnknownEventType(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event row as consumed from the events source.
///
/// Identifier columns stay textual here; they are cast during normalization.
/// `epoch_ms` is `None` when the source cell is empty or not an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub epoch_ms: Option<i64>,
    pub visitor_id: String,
    pub event_type: String,
    pub item_id: String,
    /// Empty when the event has no transaction.
    pub transaction_id: String,
}

/// A retained event with typed identifiers and derived time columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub epoch_ms: Option<i64>,
    /// Whole-second instant. `None` when the epoch is absent or outside the calendar range.
    pub event_time: Option<DateTime<Utc>>,
    pub event_date: Option<NaiveDate>,
    pub visitor_id: Option<i64>,
    pub event_type: EventType,
    pub item_id: Option<i64>,
    pub transaction_id: Option<i64>,
}

/// A normalized event with its item attributes and category path attached.
///
/// Both enrichments use left-join semantics: a missing match leaves the
/// fields `None` and never removes the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub epoch_ms: Option<i64>,
    pub event_time: Option<DateTime<Utc>>,
    pub event_date: Option<NaiveDate>,
    pub visitor_id: Option<i64>,
    pub event_type: EventType,
    pub item_id: Option<i64>,
    pub transaction_id: Option<i64>,
    pub category_id: Option<String>,
    pub available: Option<String>,
    pub price: Option<String>,
    pub category_path: Option<Vec<i64>>,
}

impl EnrichedEvent {
    /// An enriched event with no item attributes and no category path.
    pub fn unmatched(event: NormalizedEvent) -> Self {
        Self {
            epoch_ms: event.epoch_ms,
            event_time: event.event_time,
            event_date: event.event_date,
            visitor_id: event.visitor_id,
            event_type: event.event_type,
            item_id: event.item_id,
            transaction_id: event.transaction_id,
            category_id: None,
            available: None,
            price: None,
            category_path: None,
        }
    }

    pub fn has_attributes(&self) -> bool {
        self.category_id.is_some() || self.available.is_some() || self.price.is_some()
    }
}

/// Identifier and time fields that failed to cast for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MalformedFields {
    pub timestamp: bool,
    pub visitor_id: bool,
    pub item_id: bool,
    pub transaction_id: bool,
    pub category_id: bool,
}

/// Per-field counts of malformed values recovered during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedValueCounts {
    pub timestamp: usize,
    pub visitor_id: usize,
    pub item_id: usize,
    pub transaction_id: usize,
    pub category_id: usize,
}

impl MalformedValueCounts {
    pub fn record(&mut self, fields: &MalformedFields) {
        self.timestamp += usize::from(fields.timestamp);
        self.visitor_id += usize::from(fields.visitor_id);
        self.item_id += usize::from(fields.item_id);
        self.transaction_id += usize::from(fields.transaction_id);
        self.category_id += usize::from(fields.category_id);
    }

    pub fn total(&self) -> usize {
        self.timestamp + self.visitor_id + self.item_id + self.transaction_id + self.category_id
    }
}

/// Counters describing one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub events_read: usize,
    pub events_retained: usize,
    pub events_dropped: usize,
    pub events_with_attributes: usize,
    pub events_with_category_path: usize,
    pub malformed: MalformedValueCounts,
}
