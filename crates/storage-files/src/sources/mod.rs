//! CSV batch source.

mod csv_source;
mod source_model;


pub use csv_source::{CsvBatchSource, SourcePaths};
pub use source_model::{CategoryTreeRow, EventRow, ItemPropertyRow};
