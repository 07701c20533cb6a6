//! JSON Lines encoding of output datasets.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::StorageError;

/// Name of the single part file written per dataset directory.
pub const PART_FILE_NAME: &str = "part-00000.jsonl";

/// Writes `records` to `dir/part-00000.jsonl`, one JSON object per line.
///
/// Creates `dir` if needed and returns the number of records written.
pub fn write_json_lines<'a, T, I>(dir: &Path, records: I) -> Result<usize, StorageError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    std::fs::create_dir_all(dir)?;
    let mut writer = BufWriter::new(File::create(dir.join(PART_FILE_NAME))?);
    let mut written = 0;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
