//! Store Module
//!
//! The façade that owns the data and index files and serves every operation.
//!
//! ## Responsibilities
//! - Open both files and recover the line count from the data file
//! - Append records and their index entries, durably, in that order
//! - Point lookups through the index and full listings in either direction
//! - Polish (rewrite both files and swap them in) and backup

mod backup;
mod compaction;

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{IoResultExt, LineStoreError, Result};
use crate::index::{self, IndexEntry};
use crate::io::sync;
use crate::record::{encode_record, read_record_at, RecordScanner};

pub use backup::BackupReport;
pub use compaction::PolishReport;

/// A stored value together with its line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line number assigned when the value was appended
    pub line: u64,
    /// The stored bytes
    pub value: Vec<u8>,
}

/// The line store
///
/// ## Concurrency Model: one RwLock around the whole aggregate
///
/// - **Exclusive**: `set`, `polish`, `close`
/// - **Shared**: `get`, `list`, `list_reverse`, `last_line`, `backup`
///
/// Readers use positional reads, so any number of them can share the file
/// handles without disturbing each other's position.
pub struct Store {
    config: StoreConfig,

    /// Data file path (also `config.path`)
    data_path: PathBuf,

    /// Index file path (`data_path` + ".idx")
    index_path: PathBuf,

    inner: RwLock<Inner>,
}

/// State guarded by the store lock
struct Inner {
    /// `None` once closed, or if polish failed after releasing the handles
    files: Option<Files>,

    /// Number of records; the bound for every lookup
    line_count: u64,
}

impl Inner {
    fn files(&self) -> Result<&Files> {
        self.files.as_ref().ok_or(LineStoreError::Closed)
    }

    fn files_mut(&mut self) -> Result<&mut Files> {
        self.files.as_mut().ok_or(LineStoreError::Closed)
    }
}

/// The two live file handles
pub(crate) struct Files {
    pub(crate) data: File,
    pub(crate) index: File,
}

impl Files {
    /// Open (creating if absent) both files for read + append
    pub(crate) fn open(data_path: &Path, index_path: &Path) -> Result<Self> {
        let data = open_append(data_path)
            .context(|| format!("failed to open data file {}", data_path.display()))?;
        let index = open_append(index_path)
            .context(|| format!("failed to open index file {}", index_path.display()))?;
        Ok(Self { data, index })
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
}

impl Store {
    /// Open or create a store at `path` with default settings
    ///
    /// The index lives next to it at `path` + ".idx".
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder().path(path.as_ref()).build();
        Self::open_with_config(config)
    }

    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open/create the data and index files
    /// 2. Scan the data file once, validating every record and counting them
    /// 3. Check the index size equals `count * 16`
    ///
    /// A mismatch is reported as corruption. The index is never rebuilt here.
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let data_path = config.path.clone();
        let index_path = index::index_path(&data_path);

        let files = Files::open(&data_path, &index_path)?;
        let line_count = recover(&files, &config).inspect_err(|e| {
            warn!(path = %data_path.display(), error = %e, "failed to recover store");
        })?;

        info!(path = %data_path.display(), lines = line_count, "opened store");

        Ok(Self {
            config,
            data_path,
            index_path,
            inner: RwLock::new(Inner {
                files: Some(files),
                line_count,
            }),
        })
    }

    /// Append a value, returning its line number
    ///
    /// Steps:
    /// 1. Write the record at the end of the data file and sync it
    /// 2. Write the index entry and sync it
    /// 3. Bump the line count
    ///
    /// If step 2 fails the data file is truncated back so both files still
    /// describe the same records.
    pub fn set(&self, value: &[u8]) -> Result<u64> {
        let limit = self.config.max_record_len;
        if value.len() > limit as usize {
            return Err(LineStoreError::ValueTooLarge {
                len: value.len(),
                limit,
            });
        }
        let record = encode_record(value)?;
        let sync_mode = self.config.sync_mode;

        let mut inner = self.inner.write();
        let line = inner.line_count;
        let files = inner.files_mut()?;

        let offset = files
            .data
            .seek(SeekFrom::End(0))
            .context(|| "failed to seek to end of data file")?;
        files
            .data
            .write_all(&record)
            .and_then(|()| sync(&files.data, sync_mode))
            .context(|| "failed to write record")
            .inspect_err(|_| rollback(&files.data, offset, "data"))?;

        let entry = IndexEntry::new(line, offset);
        files
            .index
            .write_all(&entry.encode())
            .and_then(|()| sync(&files.index, sync_mode))
            .context(|| "failed to write index entry")
            .inspect_err(|_| {
                rollback(&files.index, index::expected_size(line), "index");
                rollback(&files.data, offset, "data");
            })?;

        inner.line_count += 1;
        debug!(line, offset, len = value.len(), "appended record");
        Ok(line)
    }

    /// Get the value stored at `line`
    ///
    /// Reads the 16-byte index entry at `line * 16`, then decodes the record
    /// at the offset it names.
    pub fn get(&self, line: u64) -> Result<Vec<u8>> {
        let inner = self.inner.read();
        let files = inner.files()?;

        if line >= inner.line_count {
            return Err(LineStoreError::LineOutOfRange {
                line,
                line_count: inner.line_count,
            });
        }

        self.read_line(files, line)
    }

    /// All lines in ascending order, decoded straight from the data file
    pub fn list(&self) -> Result<Vec<Line>> {
        let inner = self.inner.read();
        let files = inner.files()?;
        let expected = inner.line_count;

        let mut lines = Vec::with_capacity(expected as usize);
        let scanner = RecordScanner::new(&files.data, self.config.max_record_len)?;
        for record in scanner.take(expected as usize) {
            let record = record?;
            lines.push(Line {
                line: record.ordinal,
                value: record.value,
            });
        }

        if lines.len() as u64 != expected {
            return Err(LineStoreError::RecordCountMismatch {
                expected,
                found: lines.len() as u64,
            });
        }

        Ok(lines)
    }

    /// All lines in descending order, each keeping its original line number
    ///
    /// Records are variable-length, so this walks the index backwards and
    /// decodes every record independently.
    pub fn list_reverse(&self) -> Result<Vec<Line>> {
        let inner = self.inner.read();
        let files = inner.files()?;

        (0..inner.line_count)
            .rev()
            .map(|line| {
                self.read_line(files, line)
                    .map(|value| Line { line, value })
            })
            .collect()
    }

    /// Line number of the last value in the store
    pub fn last_line(&self) -> Result<u64> {
        let inner = self.inner.read();
        if inner.files.is_none() {
            return Err(LineStoreError::Closed);
        }

        match inner.line_count {
            0 => Err(LineStoreError::EmptyStore),
            n => Ok(n - 1),
        }
    }

    /// Close the store and release both file handles
    ///
    /// Both handles get a final sync even if the first one fails; the data
    /// file's error is reported ahead of the index file's.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let files = inner.files.take().ok_or(LineStoreError::Closed)?;

        let data_result = files.data.sync_all();
        let index_result = files.index.sync_all();
        drop(files);

        if let Err(e) = &data_result {
            warn!(error = %e, "failed to close data file");
        }
        if let Err(e) = &index_result {
            warn!(error = %e, "failed to close index file");
        }

        data_result.context(|| "failed to close data file")?;
        index_result.context(|| "failed to close index file")?;

        debug!(path = %self.data_path.display(), "closed store");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of lines in the store
    pub fn len(&self) -> u64 {
        self.inner.read().line_count
    }

    /// True when no value has been appended
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once `close` has run (or polish lost the handles)
    pub fn is_closed(&self) -> bool {
        self.inner.read().files.is_none()
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.data_path
    }

    /// Path of the index file
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// The configuration this store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_line(&self, files: &Files, line: u64) -> Result<Vec<u8>> {
        let entry = index::read_entry(&files.index, line)?;
        read_record_at(&files.data, entry.offset, line, self.config.max_record_len)
    }
}

/// Count the records in the data file and check the index agrees
fn recover(files: &Files, config: &StoreConfig) -> Result<u64> {
    let line_count = RecordScanner::new(&files.data, config.max_record_len)?.count_records()?;

    let actual = files
        .index
        .metadata()
        .context(|| "failed to stat index file")?
        .len();
    let expected = index::expected_size(line_count);
    if actual != expected {
        return Err(LineStoreError::IndexSizeMismatch {
            actual,
            expected,
            line_count,
        });
    }

    Ok(line_count)
}

/// Best-effort truncation back to `len` after a failed append
fn rollback(file: &File, len: u64, which: &str) {
    if let Err(e) = file.set_len(len).and_then(|()| file.sync_all()) {
        warn!(file = which, len, error = %e, "failed to roll back partial append");
    }
}
