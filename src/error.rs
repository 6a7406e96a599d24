//! Error types for LineStore
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using LineStoreError
pub type Result<T> = std::result::Result<T, LineStoreError>;

/// Unified error type for LineStore operations
#[derive(Debug, Error)]
pub enum LineStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{context}: {source}")]
    IoContext {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Corruption
    // -------------------------------------------------------------------------
    #[error("invalid record tag {tag} at line {ordinal} (offset {offset})")]
    InvalidTag { ordinal: u64, offset: u64, tag: u8 },

    #[error("truncated record header at line {ordinal} (offset {offset})")]
    TruncatedHeader { ordinal: u64, offset: u64 },

    #[error("record at line {ordinal} (offset {offset}) declares {len} bytes but file ends at {file_len}")]
    RecordOverrun {
        ordinal: u64,
        offset: u64,
        len: u32,
        file_len: u64,
    },

    #[error("invalid value length {len} at line {ordinal} (limit {limit})")]
    RecordTooLarge { ordinal: u64, len: u32, limit: u32 },

    #[error("failed to read value at line {ordinal} (read {read}/{expected} bytes)")]
    TruncatedRecord {
        ordinal: u64,
        expected: u32,
        read: usize,
    },

    #[error("failed to read index entry for line {ordinal}")]
    TruncatedIndexEntry { ordinal: u64 },

    #[error("index file size {actual} does not match expected {expected} ({line_count} lines)")]
    IndexSizeMismatch {
        actual: u64,
        expected: u64,
        line_count: u64,
    },

    #[error("data file holds {found} records, expected {expected}")]
    RecordCountMismatch { expected: u64, found: u64 },

    // -------------------------------------------------------------------------
    // Range Errors
    // -------------------------------------------------------------------------
    #[error("line {line} exceeds total lines {line_count}")]
    LineOutOfRange { line: u64, line_count: u64 },

    #[error("store is empty")]
    EmptyStore,

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("value of {len} bytes exceeds the record limit of {limit} bytes")]
    ValueTooLarge { len: usize, limit: u32 },

    #[error("backup destination {} overlaps the live store files", .0.display())]
    InvalidBackupPath(PathBuf),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("store is closed")]
    Closed,
}

impl LineStoreError {
    /// True for errors caused by on-disk state violating the file format.
    ///
    /// Callers can use this to decide whether restoring from a backup is
    /// the right response rather than retrying.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidTag { .. }
                | Self::TruncatedHeader { .. }
                | Self::RecordOverrun { .. }
                | Self::RecordTooLarge { .. }
                | Self::TruncatedRecord { .. }
                | Self::TruncatedIndexEntry { .. }
                | Self::IndexSizeMismatch { .. }
                | Self::RecordCountMismatch { .. }
        )
    }
}

/// Attach a description of the failing step to an I/O result.
pub(crate) trait IoResultExt<T> {
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| LineStoreError::IoContext {
            context: f().into(),
            source,
        })
    }
}
