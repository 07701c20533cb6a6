//! Row shapes of the three raw CSV files.
//!
//! Every column is read as text so that a bad cell never fails the read.
//! Casting happens here, per row: a bad value becomes an absent field, and a
//! row whose key cannot be cast is rejected for the caller to count.

use serde::Deserialize;

use clickstream_core::categories::CategoryEdge;
use clickstream_core::errors::ValidationError;
use clickstream_core::events::{parse_identifier, RawEvent};
use clickstream_core::properties::PropertyChange;
use clickstream_core::utils::time_utils::instant_from_epoch_millis;

/// One row of `events.csv`.
///
/// Identifier columns stay textual here; the enricher casts them so that a bad
/// value costs a field, not the row.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    #[serde(default)]
    pub timestamp: String,
    pub visitorid: String,
    pub event: String,
    pub itemid: String,
    #[serde(default)]
    pub transactionid: String,
}

impl EventRow {
    pub const COLUMNS: [&'static str; 5] =
        ["timestamp", "visitorid", "event", "itemid", "transactionid"];
}

impl From<EventRow> for RawEvent {
    fn from(row: EventRow) -> Self {
        RawEvent {
            epoch_ms: parse_identifier(&row.timestamp).ok(),
            visitor_id: row.visitorid,
            event_type: row.event,
            item_id: row.itemid,
            transaction_id: row.transactionid,
        }
    }
}

/// One row of an item properties file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPropertyRow {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub itemid: String,
    pub property: String,
    pub value: String,
}

impl ItemPropertyRow {
    pub const COLUMNS: [&'static str; 4] = ["timestamp", "itemid", "property", "value"];
}

/// Fails when the item id or change time does not cast; a change without
/// either cannot take part in the latest-value selection.
impl TryFrom<ItemPropertyRow> for PropertyChange {
    type Error = ValidationError;

    fn try_from(row: ItemPropertyRow) -> Result<Self, Self::Error> {
        let item_id = parse_identifier(&row.itemid)?;
        let change_time = instant_from_epoch_millis(parse_identifier(&row.timestamp)?)?;
        Ok(PropertyChange {
            item_id,
            property_name: row.property,
            change_time,
            raw_value: row.value,
        })
    }
}

/// One row of `category_tree.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTreeRow {
    #[serde(default)]
    pub categoryid: String,
    #[serde(default)]
    pub parentid: String,
}

impl CategoryTreeRow {
    pub const COLUMNS: [&'static str; 2] = ["categoryid", "parentid"];

    /// Converts to an edge. The flag is set when a non-empty parent failed to
    /// parse and the category was kept as a root.
    ///
    /// Fails when `categoryid` itself does not cast.
    pub fn into_edge(self) -> Result<(CategoryEdge, bool), ValidationError> {
        let category_id = parse_identifier(&self.categoryid)?;
        if self.parentid.trim().is_empty() {
            return Ok((CategoryEdge::root(category_id), false));
        }
        Ok(match parse_identifier(&self.parentid) {
            Ok(parent) => (CategoryEdge::new(category_id, Some(parent)), false),
            Err(_) => (CategoryEdge::root(category_id), true),
        })
    }
}
