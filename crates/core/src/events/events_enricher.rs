//! Normalizes the raw event stream and attaches item attributes and category paths.

use log::{debug, warn};
use rayon::prelude::*;

use crate::categories::CategoryPathIndex;
use crate::errors::ValidationError;
use crate::properties::ItemAttributesIndex;
use crate::utils::time_utils::{event_date_from_utc, event_time_from_epoch_millis};

use super::{
    EnrichedEvent, EnrichmentStats, EventType, MalformedFields, MalformedValueCounts,
    NormalizedEvent, RawEvent,
};

/// Output of one enrichment run.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutput {
    /// Enriched events in input order.
    pub events: Vec<EnrichedEvent>,
    pub stats: EnrichmentStats,
}

/// Left-joins events against the resolved item attributes and category paths.
///
/// Both lookups have at most one match per key, so each retained event yields
/// exactly one enriched event.
pub struct EventEnricher<'a> {
    attributes: &'a ItemAttributesIndex,
    paths: &'a CategoryPathIndex,
}

impl<'a> EventEnricher<'a> {
    pub fn new(attributes: &'a ItemAttributesIndex, paths: &'a CategoryPathIndex) -> Self {
        Self { attributes, paths }
    }

    pub fn enrich(&self, raw_events: &[RawEvent]) -> EnrichmentOutput {
        let enriched: Vec<(EnrichedEvent, MalformedFields)> = raw_events
            .par_iter()
            .filter_map(normalize_event)
            .map(|(event, malformed)| self.enrich_event(event, malformed))
            .collect();

        let mut malformed = MalformedValueCounts::default();
        let mut with_attributes = 0;
        let mut with_category_path = 0;
        let events: Vec<EnrichedEvent> = enriched
            .into_iter()
            .map(|(event, fields)| {
                malformed.record(&fields);
                with_attributes += usize::from(event.has_attributes());
                with_category_path += usize::from(event.category_path.is_some());
                event
            })
            .collect();

        let stats = EnrichmentStats {
            events_read: raw_events.len(),
            events_retained: events.len(),
            events_dropped: raw_events.len() - events.len(),
            events_with_attributes: with_attributes,
            events_with_category_path: with_category_path,
            malformed,
        };

        if malformed.total() > 0 {
            warn!(
                "Recovered malformed event values: {} timestamps, {} visitor ids, {} item ids, {} transaction ids, {} category ids",
                malformed.timestamp,
                malformed.visitor_id,
                malformed.item_id,
                malformed.transaction_id,
                malformed.category_id
            );
        }
        debug!(
            "Enriched {} of {} events ({} dropped by type, {} with attributes, {} with category path)",
            stats.events_retained,
            stats.events_read,
            stats.events_dropped,
            stats.events_with_attributes,
            stats.events_with_category_path
        );

        EnrichmentOutput { events, stats }
    }

    fn enrich_event(
        &self,
        event: NormalizedEvent,
        mut malformed: MalformedFields,
    ) -> (EnrichedEvent, MalformedFields) {
        let attributes = event.item_id.and_then(|id| self.attributes.get(&id));
        let mut enriched = EnrichedEvent::unmatched(event);

        if let Some(attributes) = attributes {
            enriched.category_id = attributes.category_id.clone();
            enriched.available = attributes.available.clone();
            enriched.price = attributes.price.clone();

            let category_key = attributes.category_key();
            malformed.category_id = attributes.category_id.is_some() && category_key.is_none();
            enriched.category_path = category_key
                .and_then(|key| self.paths.get(&key))
                .map(|path| path.path.clone());
        }

        (enriched, malformed)
    }
}

/// Filters and normalizes one raw event.
///
/// Returns `None` for event types outside the tracked set. Identifier casts
/// that fail leave the field `None` and are flagged in `MalformedFields`.
pub fn normalize_event(raw: &RawEvent) -> Option<(NormalizedEvent, MalformedFields)> {
    let event_type = raw.event_type.parse::<EventType>().ok()?;
    let mut malformed = MalformedFields::default();

    let event_time = match raw.epoch_ms.map(event_time_from_epoch_millis) {
        Some(Ok(instant)) => Some(instant),
        _ => {
            malformed.timestamp = true;
            None
        }
    };
    let (visitor_id, bad_visitor) = cast_identifier(&raw.visitor_id);
    let (item_id, bad_item) = cast_identifier(&raw.item_id);
    let (transaction_id, bad_transaction) = cast_identifier(&raw.transaction_id);
    malformed.visitor_id = bad_visitor;
    malformed.item_id = bad_item;
    malformed.transaction_id = bad_transaction;

    let event = NormalizedEvent {
        epoch_ms: raw.epoch_ms,
        event_time,
        event_date: event_time.map(event_date_from_utc),
        visitor_id,
        event_type,
        item_id,
        transaction_id,
    };
    Some((event, malformed))
}

/// Strictly parses an integer identifier.
pub fn parse_identifier(raw: &str) -> Result<i64, ValidationError> {
    Ok(raw.trim().parse::<i64>()?)
}

/// Casts an identifier column: empty means absent, unparseable means absent
/// and malformed.
fn cast_identifier(raw: &str) -> (Option<i64>, bool) {
    if raw.trim().is_empty() {
        return (None, false);
    }
    match parse_identifier(raw) {
        Ok(id) => (Some(id), false),
        Err(_) => (None, true),
    }
}
