//! Domain models for the item property change log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::NUMERIC_VALUE_PREFIX;
use crate::errors::ValidationError;

/// One observed value of an item attribute at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub item_id: i64,
    pub property_name: String,
    pub change_time: DateTime<Utc>,
    pub raw_value: String,
}

impl PropertyChange {
    /// Total order used to pick the current value of a key.
    ///
    /// Later `change_time` wins; equal times fall back to the greater raw value.
    pub fn supersedes(&self, other: &PropertyChange) -> bool {
        (self.change_time, self.raw_value.as_str()) > (other.change_time, other.raw_value.as_str())
    }
}

/// The current value of one `(item_id, property_name)` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProperty {
    pub item_id: i64,
    pub property_name: String,
    pub change_time: DateTime<Utc>,
    pub value: String,
    pub numeric_value: Option<f64>,
}

impl From<PropertyChange> for ResolvedProperty {
    fn from(change: PropertyChange) -> Self {
        let numeric_value = numeric_value_of(&change.raw_value);
        Self {
            item_id: change.item_id,
            property_name: change.property_name,
            change_time: change.change_time,
            value: change.raw_value,
            numeric_value,
        }
    }
}

/// Wide per-item projection of the three attributes used for enrichment.
///
/// `category_id` keeps the raw change-log value; it is reinterpreted as a
/// category key only when joining against the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub item_id: i64,
    pub category_id: Option<String>,
    pub available: Option<String>,
    pub price: Option<String>,
}

impl ItemAttributes {
    pub fn new(item_id: i64) -> Self {
        Self {
            item_id,
            ..Default::default()
        }
    }

    /// Category key for the hierarchy join. `None` when absent or not an integer.
    pub fn category_key(&self) -> Option<i64> {
        self.category_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
    }
}

/// Strictly parses a prefixed numeric value such as `n19.99`.
pub fn parse_numeric_value(raw_value: &str) -> Result<f64, ValidationError> {
    let digits = raw_value
        .strip_prefix(NUMERIC_VALUE_PREFIX)
        .ok_or_else(|| ValidationError::MissingNumericPrefix(raw_value.to_string()))?;
    let value = digits.trim().parse::<f64>()?;
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber(raw_value.to_string()));
    }
    Ok(value)
}

/// Lenient form of [`parse_numeric_value`]: any failure yields `None`.
pub fn numeric_value_of(raw_value: &str) -> Option<f64> {
    parse_numeric_value(raw_value).ok()
}

/// Whether a raw value carries the numeric prefix but fails to parse.
pub fn is_malformed_numeric(raw_value: &str) -> bool {
    raw_value.starts_with(NUMERIC_VALUE_PREFIX) && numeric_value_of(raw_value).is_none()
}
