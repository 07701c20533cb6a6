//! Collapses the property change log into current values.

use log::{debug, warn};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::constants::{AVAILABLE_PROPERTY, CATEGORY_PROPERTY, PRICE_PROPERTY};

use super::{is_malformed_numeric, ItemAttributes, PropertyChange, ResolvedProperty};

type PropertyKey = (i64, String);

/// Per-item attribute lookup consumed by the event enricher.
pub type ItemAttributesIndex = HashMap<i64, ItemAttributes>;

/// Result of resolving one change log.
#[derive(Debug, Clone, Default)]
pub struct PropertySnapshot {
    /// One entry per `(item_id, property_name)`, sorted by that key.
    pub latest: Vec<ResolvedProperty>,
    /// Items carrying at least one of the projected attributes.
    pub attributes: ItemAttributesIndex,
    /// Resolved values with the numeric prefix that did not parse.
    pub malformed_numeric_values: usize,
}

/// Resolves the current value of every item attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertySnapshotResolver;

impl PropertySnapshotResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves the latest values and the wide attribute projection in one pass.
    pub fn resolve(&self, changes: Vec<PropertyChange>) -> PropertySnapshot {
        let change_count = changes.len();
        let latest = self.resolve_latest(changes);
        let attributes = self.project_attributes(&latest);

        let malformed_numeric_values = latest
            .par_iter()
            .filter(|property| is_malformed_numeric(&property.value))
            .count();
        if malformed_numeric_values > 0 {
            warn!(
                "{} resolved properties carry a numeric prefix but no parseable number; numeric_value left empty",
                malformed_numeric_values
            );
        }

        debug!(
            "Resolved {} property changes into {} current values across {} items with attributes",
            change_count,
            latest.len(),
            attributes.len()
        );

        PropertySnapshot {
            latest,
            attributes,
            malformed_numeric_values,
        }
    }

    /// Picks, for every `(item_id, property_name)`, the change that supersedes all others.
    ///
    /// The result does not depend on input order or on how rayon splits the input.
    pub fn resolve_latest(&self, changes: Vec<PropertyChange>) -> Vec<ResolvedProperty> {
        let winners = changes
            .into_par_iter()
            .fold(HashMap::new, |mut acc, change| {
                keep_latest(&mut acc, change);
                acc
            })
            .reduce(HashMap::new, |mut left, right| {
                for change in right.into_values() {
                    keep_latest(&mut left, change);
                }
                left
            });

        let mut latest: Vec<ResolvedProperty> = winners
            .into_par_iter()
            .map(|(_, change)| ResolvedProperty::from(change))
            .collect();
        latest.par_sort_unstable_by(|a, b| {
            (a.item_id, a.property_name.as_str()).cmp(&(b.item_id, b.property_name.as_str()))
        });
        latest
    }

    /// Pivots the three enrichment attributes into one record per item.
    ///
    /// Items with none of them produce no record.
    pub fn project_attributes(&self, latest: &[ResolvedProperty]) -> ItemAttributesIndex {
        let mut index = ItemAttributesIndex::new();
        for property in latest {
            let name = property.property_name.as_str();
            if !matches!(name, CATEGORY_PROPERTY | AVAILABLE_PROPERTY | PRICE_PROPERTY) {
                continue;
            }
            let attrs = index
                .entry(property.item_id)
                .or_insert_with(|| ItemAttributes::new(property.item_id));
            let value = Some(property.value.clone());
            match name {
                CATEGORY_PROPERTY => attrs.category_id = value,
                AVAILABLE_PROPERTY => attrs.available = value,
                _ => attrs.price = value,
            }
        }
        index
    }
}

fn keep_latest(acc: &mut HashMap<PropertyKey, PropertyChange>, change: PropertyChange) {
    match acc.entry((change.item_id, change.property_name.clone())) {
        Entry::Occupied(mut current) => {
            if change.supersedes(current.get()) {
                current.insert(change);
            }
        }
        Entry::Vacant(slot) => {
            slot.insert(change);
        }
    }
}
