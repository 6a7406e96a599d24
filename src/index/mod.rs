//! Offset Index Module
//!
//! Fixed-width side file mapping each line number to the byte offset of its
//! record, for O(1) seek-based lookup without scanning the log.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────┐  offset 0
//! │ Ordinal (8) │ DataOffset (8) │  line 0
//! ├──────────────────────────────┤  offset 16
//! │ Ordinal (8) │ DataOffset (8) │  line 1
//! ├──────────────────────────────┤
//! │ ...                          │
//! └──────────────────────────────┘
//! ```
//!
//! Both fields are little-endian. Entry `i` always sits at `i * 16`; lookups
//! address entries by position and never trust the ordinal field for that.

mod entry;

use std::path::{Path, PathBuf};

pub use entry::{read_entry, IndexEntry};

/// Ordinal (8) + DataOffset (8)
pub const INDEX_ENTRY_SIZE: u64 = 16;

/// Suffix appended to the data file path to name its index
pub const INDEX_SUFFIX: &str = ".idx";

/// Path of the index file belonging to `data_path`
pub fn index_path(data_path: &Path) -> PathBuf {
    with_suffix(data_path, INDEX_SUFFIX)
}

/// Expected index file size for `line_count` records
pub fn expected_size(line_count: u64) -> u64 {
    line_count.saturating_mul(INDEX_ENTRY_SIZE)
}

/// Append a suffix to the full path ("db" + ".idx" -> "db.idx")
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
