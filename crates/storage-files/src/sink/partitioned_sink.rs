//! File-system sink that stages a whole batch and publishes it on commit.
//!
//! Layout under the output directory:
//!
//! ```text
//! <output>/_staging-<run>/enriched_events/event_type=view/event_date=2015-06-02/part-00000.jsonl
//! <output>/_staging-<run>/latest_properties/part-00000.jsonl
//! <output>/_staging-<run>/category_hierarchy/part-00000.jsonl
//! ```
//!
//! `commit` renames each staged dataset directory over the published one.
//! Previously published datasets are parked in `_previous-<run>` until all
//! three swaps succeed, and restored if any of them fails.

use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use clickstream_core::categories::CategoryPath;
use clickstream_core::constants::{
    CATEGORY_HIERARCHY_DATASET, ENRICHED_EVENTS_DATASET, LATEST_PROPERTIES_DATASET,
};
use clickstream_core::errors::SinkError;
use clickstream_core::pipeline::{DatasetSinkTrait, EventPartitions};
use clickstream_core::properties::ResolvedProperty;
use clickstream_core::Result;

use super::write_json_lines;
use crate::errors::{SinkResultExt, StorageError};

pub const STAGING_DIR_PREFIX: &str = "_staging-";
const PREVIOUS_DIR_PREFIX: &str = "_previous-";

const OUTPUT_DATASETS: [&str; 3] = [
    ENRICHED_EVENTS_DATASET,
    LATEST_PROPERTIES_DATASET,
    CATEGORY_HIERARCHY_DATASET,
];

#[derive(Debug, Default)]
struct SinkState {
    written: BTreeSet<&'static str>,
    committed: bool,
    aborted: bool,
}

impl SinkState {
    fn is_finished(&self) -> bool {
        self.committed || self.aborted
    }
}

/// Writes the three output datasets as JSON Lines under one output directory.
#[derive(Debug)]
pub struct PartitionedFileSink {
    output_dir: PathBuf,
    run_id: Uuid,
    staging_dir: PathBuf,
    state: Mutex<SinkState>,
}

impl PartitionedFileSink {
    /// Creates the output directory and a fresh staging directory for one run.
    ///
    /// Leftovers of runs that never finished are swept first. The output
    /// directory must have a single writer at a time.
    pub fn open(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        let run_id = Uuid::new_v4();
        let staging_dir = output_dir.join(format!("{}{}", STAGING_DIR_PREFIX, run_id));
        let open_failed = |e: std::io::Error| SinkError::WriteFailed {
            dataset: output_dir.display().to_string(),
            reason: e.to_string(),
        };
        fs::create_dir_all(&output_dir).map_err(open_failed)?;
        sweep_unfinished_runs(&output_dir).map_err(open_failed)?;
        fs::create_dir_all(&staging_dir).map_err(open_failed)?;
        debug!("Staging batch {} in {}", run_id, staging_dir.display());

        Ok(Self {
            output_dir,
            run_id,
            staging_dir,
            state: Mutex::new(SinkState::default()),
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Published location of `dataset`.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.output_dir.join(dataset)
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `write` against the staged directory of `dataset` unless the batch
    /// is already finished.
    fn stage<F>(&self, dataset: &'static str, write: F) -> Result<()>
    where
        F: FnOnce(&Path) -> std::result::Result<usize, StorageError>,
    {
        let mut state = self.lock();
        if state.is_finished() {
            return Err(SinkError::AlreadyFinished.into());
        }

        let dir = self.staging_dir.join(dataset);
        if dir.exists() {
            fs::remove_dir_all(&dir).for_dataset(dataset)?;
        }
        fs::create_dir_all(&dir).for_dataset(dataset)?;
        let records = write(&dir).for_dataset(dataset)?;

        state.written.insert(dataset);
        debug!("Staged {} records of {}", records, dataset);
        Ok(())
    }

    fn swap_all(&self, previous_dir: &Path) -> std::result::Result<(), StorageError> {
        fs::create_dir_all(previous_dir)?;
        let mut swapped: Vec<&str> = Vec::new();
        for dataset in OUTPUT_DATASETS {
            if let Err(e) = self.swap_dataset(dataset, previous_dir) {
                self.restore_partial(dataset, previous_dir);
                for done in swapped.iter().rev() {
                    self.restore_swapped(done, previous_dir);
                }
                return Err(e);
            }
            swapped.push(dataset);
        }
        Ok(())
    }

    fn swap_dataset(&self, dataset: &str, previous_dir: &Path) -> std::result::Result<(), StorageError> {
        let target = self.dataset_dir(dataset);
        if target.exists() {
            fs::rename(&target, previous_dir.join(dataset))?;
        }
        fs::rename(self.staging_dir.join(dataset), &target)?;
        Ok(())
    }

    /// Undoes a fully swapped dataset.
    fn restore_swapped(&self, dataset: &str, previous_dir: &Path) {
        let target = self.dataset_dir(dataset);
        if let Err(e) = fs::remove_dir_all(&target) {
            error!("Failed to remove {} while rolling back: {}", target.display(), e);
            return;
        }
        self.restore_partial(dataset, previous_dir);
    }

    /// Moves a parked dataset back, if the failed swap got as far as parking it.
    fn restore_partial(&self, dataset: &str, previous_dir: &Path) {
        let previous = previous_dir.join(dataset);
        let target = self.dataset_dir(dataset);
        if previous.exists() && !target.exists() {
            if let Err(e) = fs::rename(&previous, &target) {
                error!(
                    "Failed to restore {} from {}: {}",
                    target.display(),
                    previous.display(),
                    e
                );
            }
        }
    }
}

impl DatasetSinkTrait for PartitionedFileSink {
    fn write_enriched_events(&self, partitions: &EventPartitions<'_>) -> Result<()> {
        self.stage(ENRICHED_EVENTS_DATASET, |dir| {
            let mut written = 0;
            for (partition, events) in partitions {
                let partition_dir = dir.join(partition.relative_dir());
                written += write_json_lines(&partition_dir, events.iter().copied())?;
            }
            Ok(written)
        })
    }

    fn write_latest_properties(&self, properties: &[ResolvedProperty]) -> Result<()> {
        self.stage(LATEST_PROPERTIES_DATASET, |dir| write_json_lines(dir, properties))
    }

    fn write_category_hierarchy(&self, paths: &[CategoryPath]) -> Result<()> {
        self.stage(CATEGORY_HIERARCHY_DATASET, |dir| write_json_lines(dir, paths))
    }

    fn commit(&self) -> Result<()> {
        let mut state = self.lock();
        if state.is_finished() {
            return Err(SinkError::AlreadyFinished.into());
        }
        if let Some(missing) = OUTPUT_DATASETS
            .iter()
            .find(|dataset| !state.written.contains(*dataset))
        {
            return Err(SinkError::CommitFailed(format!("dataset '{}' was not written", missing)).into());
        }

        let previous_dir = self
            .output_dir
            .join(format!("{}{}", PREVIOUS_DIR_PREFIX, self.run_id));
        self.swap_all(&previous_dir)
            .map_err(|e| SinkError::CommitFailed(e.to_string()))?;
        state.committed = true;

        for leftover in [&previous_dir, &self.staging_dir] {
            if let Err(e) = fs::remove_dir_all(leftover) {
                warn!("Failed to clean up {}: {}", leftover.display(), e);
            }
        }
        info!("Committed batch {} to {}", self.run_id, self.output_dir.display());
        Ok(())
    }

    fn abort(&self) -> Result<()> {
        let mut state = self.lock();
        if state.committed {
            return Err(SinkError::AlreadyFinished.into());
        }
        state.aborted = true;
        if self.staging_dir.exists() {
            fs::remove_dir_all(&self.staging_dir)
                .map_err(|e| SinkError::AbortFailed(e.to_string()))?;
        }
        info!("Discarded staged batch {}", self.run_id);
        Ok(())
    }
}

impl Drop for PartitionedFileSink {
    fn drop(&mut self) {
        let state = self.lock();
        if !state.is_finished() && self.staging_dir.exists() {
            debug!("Removing unfinished staging directory {}", self.staging_dir.display());
            if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
                warn!("Failed to clean up {}: {}", self.staging_dir.display(), e);
            }
        }
    }
}

/// Removes staging directories left by runs that were killed, and puts back
/// any published dataset a killed commit had parked but not replaced.
fn sweep_unfinished_runs(output_dir: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let path = entry.path();

        if name.starts_with(STAGING_DIR_PREFIX) {
            warn!("Removing staging directory of an unfinished run: {}", path.display());
            fs::remove_dir_all(&path)?;
        } else if name.starts_with(PREVIOUS_DIR_PREFIX) {
            for dataset in OUTPUT_DATASETS {
                let parked = path.join(dataset);
                let target = output_dir.join(dataset);
                if parked.exists() && !target.exists() {
                    warn!("Restoring {} parked by an unfinished commit", target.display());
                    fs::rename(&parked, &target)?;
                }
            }
            fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}
