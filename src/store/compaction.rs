//! Polish (compaction)
//!
//! Rewrites the data and index files from scratch in forward order, then
//! swaps the fresh files in with a rename per file.
//!
//! ## Procedure
//! 1. Back up both live files to `{path}.backup` / `{path}.backup.idx`
//! 2. Re-scan the data file into `{path}.tmp` and `{path}.idx.tmp`
//! 3. Sync both scratch files
//! 4. Release the live handles
//! 5. Rename data, then index, over the live paths
//! 6. Reopen and adopt the new line count
//!
//! Everything before step 5 leaves the live files untouched. A crash between
//! the two renames is the one window where they can disagree.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{IoResultExt, LineStoreError, Result};
use crate::index::{with_suffix, IndexEntry};
use crate::io::sync;
use crate::record::{encode_record, RecordScanner};

use super::backup::copy_store_files;
use super::{Files, Store};

/// Suffix of the safety copy taken before every polish
pub const BACKUP_SUFFIX: &str = ".backup";

const TMP_DATA_SUFFIX: &str = ".tmp";
const TMP_INDEX_SUFFIX: &str = ".idx.tmp";

/// Outcome of a polish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolishReport {
    /// Records rewritten (the line count after polish)
    pub records: u64,
    /// Data file size before polish
    pub bytes_before: u64,
    /// Data file size after polish
    pub bytes_after: u64,
    /// Where the pre-polish backup was written
    pub backup_path: PathBuf,
}

impl Store {
    /// Rewrite both files in current order and atomically replace them
    ///
    /// Holds the exclusive lock for the whole procedure. Line numbers and
    /// values are unchanged afterwards.
    pub fn polish(&self) -> Result<PolishReport> {
        let mut inner = self.inner.write();
        let expected = inner.line_count;

        let backup_path = with_suffix(&self.data_path, BACKUP_SUFFIX);
        let tmp_data = with_suffix(&self.data_path, TMP_DATA_SUFFIX);
        let tmp_index = with_suffix(&self.data_path, TMP_INDEX_SUFFIX);

        let (bytes_before, bytes_after) = {
            let files = inner.files()?;

            copy_store_files(files, &backup_path)?;
            debug!(backup = %backup_path.display(), "wrote pre-polish backup");

            self.rewrite(files, &tmp_data, &tmp_index, expected)
                .inspect_err(|_| remove_scratch(&[tmp_data.as_path(), tmp_index.as_path()]))?
        };

        // Release the live handles before swapping the files underneath them
        inner.files = None;

        if let Err(source) = fs::rename(&tmp_data, &self.data_path) {
            remove_scratch(&[tmp_data.as_path(), tmp_index.as_path()]);
            // Nothing was replaced; put the original handles back
            inner.files = Some(Files::open(&self.data_path, &self.index_path)?);
            return Err(LineStoreError::IoContext {
                context: "failed to replace original data file".to_string(),
                source,
            });
        }

        fs::rename(&tmp_index, &self.index_path)
            .context(|| "failed to replace original index file")
            .inspect_err(|e| warn!(error = %e, "data file replaced but index was not; store left closed"))?;

        inner.files = Some(Files::open(&self.data_path, &self.index_path)?);
        inner.line_count = expected;

        sync_parent_dir(&self.data_path).context(|| "failed to sync store directory")?;

        info!(
            path = %self.data_path.display(),
            records = expected,
            bytes_before,
            bytes_after,
            "polish complete"
        );

        Ok(PolishReport {
            records: expected,
            bytes_before,
            bytes_after,
            backup_path,
        })
    }

    /// Re-encode every record into fresh scratch files
    ///
    /// Returns (data bytes read, data bytes written).
    fn rewrite(
        &self,
        files: &Files,
        tmp_data: &Path,
        tmp_index: &Path,
        expected: u64,
    ) -> Result<(u64, u64)> {
        let mut data_out = BufWriter::new(
            create_scratch(tmp_data).context(|| "failed to create temp data file")?,
        );
        let mut index_out = BufWriter::new(
            create_scratch(tmp_index).context(|| "failed to create temp index file")?,
        );

        let scanner = RecordScanner::new(&files.data, self.config.max_record_len)?;
        let bytes_before = scanner.file_len();

        let mut offset = 0u64;
        let mut records = 0u64;
        for record in scanner {
            let record = record?;
            let encoded = encode_record(&record.value)?;

            data_out
                .write_all(&encoded)
                .context(|| "failed to write polished record")?;
            index_out
                .write_all(&IndexEntry::new(records, offset).encode())
                .context(|| "failed to write polished index entry")?;

            offset += encoded.len() as u64;
            records += 1;
        }

        if records != expected {
            return Err(LineStoreError::RecordCountMismatch {
                expected,
                found: records,
            });
        }

        let data_file = finish_scratch(data_out).context(|| "failed to sync temp data file")?;
        let index_file = finish_scratch(index_out).context(|| "failed to sync temp index file")?;
        sync(&data_file, self.config.sync_mode).context(|| "failed to sync temp data file")?;
        sync(&index_file, self.config.sync_mode).context(|| "failed to sync temp index file")?;

        Ok((bytes_before, offset))
    }
}

fn create_scratch(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn finish_scratch(writer: BufWriter<File>) -> io::Result<File> {
    writer.into_inner().map_err(|e| e.into_error())
}

/// Best-effort removal of scratch files after a failed polish
fn remove_scratch(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove polish scratch file");
            }
        }
    }
}

/// Fsync the directory holding `path` so the renames are durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
