//! Clickstream Core - domain models, resolvers, and the batch pipeline.
//!
//! This crate holds the transform that turns the raw event log, the item
//! property change log, and the category tree into the enriched event dataset.
//! It performs no I/O of its own: sources and sinks are traits implemented by
//! the `storage-files` crate (or the in-memory adapters in [`pipeline`]).
//!
//! ```text
//! property changes ─► PropertySnapshotResolver ─┐
//!                                               ├─► EventEnricher ─► enriched events
//! category tree ───► HierarchyPathResolver ─────┘         ▲
//!                                                         │
//! raw events ─────────────────────────────────────────────┘
//! ```

pub mod categories;
pub mod constants;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod properties;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
