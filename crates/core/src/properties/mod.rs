//! Item properties module - change-log models and the snapshot resolver.

mod properties_model;
mod properties_service;

pub use properties_model::{
    is_malformed_numeric, numeric_value_of, parse_numeric_value, ItemAttributes, PropertyChange,
    ResolvedProperty,
};
pub use properties_service::{ItemAttributesIndex, PropertySnapshot, PropertySnapshotResolver};


#[cfg(test)]
mod properties_service_tests;
