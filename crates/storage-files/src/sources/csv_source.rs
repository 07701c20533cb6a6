//! Reads the raw events, item properties, and category tree CSV files.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

use clickstream_core::categories::CategoryEdge;
use clickstream_core::errors::{Error, SourceDataset, SourceError};
use clickstream_core::events::RawEvent;
use clickstream_core::pipeline::BatchSourceTrait;
use clickstream_core::properties::PropertyChange;
use clickstream_core::Result;

use super::{CategoryTreeRow, EventRow, ItemPropertyRow};
use crate::errors::SourceResultExt;

/// Locations of the raw input files.
///
/// The item properties log may be split across several files; they are read
/// in order and concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub events: PathBuf,
    pub item_properties: Vec<PathBuf>,
    pub category_tree: PathBuf,
}

/// Batch source backed by CSV files with header rows.
#[derive(Debug, Clone)]
pub struct CsvBatchSource {
    paths: SourcePaths,
}

impl CsvBatchSource {
    pub fn new(paths: SourcePaths) -> Self {
        Self { paths }
    }
}

impl BatchSourceTrait for CsvBatchSource {
    fn read_events(&self) -> Result<Vec<RawEvent>> {
        let rows: Vec<(u64, EventRow)> =
            read_rows(SourceDataset::Events, &self.paths.events, &EventRow::COLUMNS)?;
        Ok(rows.into_iter().map(|(_, row)| RawEvent::from(row)).collect())
    }

    fn read_property_changes(&self) -> Result<Vec<PropertyChange>> {
        let dataset = SourceDataset::ItemProperties;
        if self.paths.item_properties.is_empty() {
            return Err(Error::Config(
                "no item properties files configured".to_string(),
            ));
        }

        let mut changes = Vec::new();
        for path in &self.paths.item_properties {
            let rows: Vec<(u64, ItemPropertyRow)> =
                read_rows(dataset, path, &ItemPropertyRow::COLUMNS)?;
            changes.reserve(rows.len());

            let mut skipped = 0usize;
            for (line, row) in rows {
                match PropertyChange::try_from(row) {
                    Ok(change) => changes.push(change),
                    Err(e) => {
                        skipped += 1;
                        debug!("Skipping {} line {}: {}", dataset, line, e);
                    }
                }
            }
            if skipped > 0 {
                warn!(
                    "Skipped {} property changes with an unparseable item id or timestamp in {}",
                    skipped,
                    path.display()
                );
            }
        }
        Ok(changes)
    }

    fn read_category_edges(&self) -> Result<Vec<CategoryEdge>> {
        let rows: Vec<(u64, CategoryTreeRow)> = read_rows(
            SourceDataset::CategoryTree,
            &self.paths.category_tree,
            &CategoryTreeRow::COLUMNS,
        )?;

        let mut malformed_parents = 0usize;
        let mut skipped = 0usize;
        let mut edges: Vec<CategoryEdge> = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            match row.into_edge() {
                Ok((edge, malformed)) => {
                    malformed_parents += usize::from(malformed);
                    edges.push(edge);
                }
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping {} line {}: {}", SourceDataset::CategoryTree, line, e);
                }
            }
        }

        if skipped > 0 {
            warn!(
                "Skipped {} category rows with an unparseable category id in {}",
                skipped,
                self.paths.category_tree.display()
            );
        }
        if malformed_parents > 0 {
            warn!(
                "Treated {} unparseable parent ids in {} as roots",
                malformed_parents,
                self.paths.category_tree.display()
            );
        }
        Ok(edges)
    }
}

/// Reads every data row of `path`, keyed by its 1-based line number.
///
/// Fails with `MissingColumn` before reading any row if the header lacks one
/// of `columns`. Extra columns are ignored.
fn read_rows<R: DeserializeOwned>(
    dataset: SourceDataset,
    path: &Path,
    columns: &[&str],
) -> Result<Vec<(u64, R)>> {
    let file = File::open(path).for_source(dataset, path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(file);

    let headers = reader.headers().for_source(dataset, path)?.clone();
    validate_headers(dataset, &headers, columns)?;

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).for_source(dataset, path)? {
        let line = record.position().map_or(0, |position| position.line());
        let row: R = record
            .deserialize(Some(&headers))
            .map_err(|e| SourceError::MalformedRow {
                dataset,
                line,
                reason: e.to_string(),
            })?;
        rows.push((line, row));
    }

    debug!("Read {} {} rows from {}", rows.len(), dataset, path.display());
    Ok(rows)
}

fn validate_headers(
    dataset: SourceDataset,
    headers: &StringRecord,
    columns: &[&str],
) -> Result<()> {
    for column in columns {
        if !headers.iter().any(|header| header == *column) {
            return Err(SourceError::MissingColumn {
                dataset,
                column: column.to_string(),
            }
            .into());
        }
    }
    Ok(())
}
