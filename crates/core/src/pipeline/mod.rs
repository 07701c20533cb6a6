//! Batch pipeline module - collaborator traits, the batch service, and in-memory adapters.

mod memory;
mod pipeline_model;
mod pipeline_service;
mod pipeline_traits;

pub use memory::{InMemoryBatchSource, InMemoryDatasetSink, MemoryDatasets};
pub use pipeline_model::{BatchOutput, BatchSummary};
pub use pipeline_service::BatchPipeline;
pub use pipeline_traits::{BatchSourceTrait, DatasetSinkTrait, EventPartitions};
