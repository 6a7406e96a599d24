//! Store backup
//!
//! Byte-for-byte copies of the data and index files to a new base path. The
//! result is an independent store that opens like any other.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{IoResultExt, LineStoreError, Result};
use crate::index;
use crate::io::FileCursor;

use super::{Files, Store};

/// Copy buffer size
const COPY_BUF_SIZE: usize = 64 * 1024;

/// Outcome of a backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    /// Path of the copied data file
    pub data_path: PathBuf,
    /// Path of the copied index file
    pub index_path: PathBuf,
    /// Bytes written to the data copy
    pub data_bytes: u64,
    /// Bytes written to the index copy
    pub index_bytes: u64,
    /// CRC-32 of the data copy
    pub data_crc: u32,
    /// CRC-32 of the index copy
    pub index_crc: u32,
}

impl Store {
    /// Back up the store to `dest` (index at `dest` + ".idx")
    ///
    /// Holds the shared lock, so it runs alongside lookups and listings but
    /// never alongside an append or polish. `polished` is accepted for
    /// callers that want a normalized copy; the live files are always
    /// already normalized, so both modes copy them as they are.
    pub fn backup(&self, dest: impl AsRef<Path>, polished: bool) -> Result<BackupReport> {
        let dest = dest.as_ref();
        self.check_backup_destination(dest)?;

        let inner = self.inner.read();
        let files = inner.files()?;

        debug!(dest = %dest.display(), polished, "starting backup");
        let report = copy_store_files(files, dest)?;
        info!(
            dest = %dest.display(),
            data_bytes = report.data_bytes,
            index_bytes = report.index_bytes,
            "backup complete"
        );
        Ok(report)
    }

    /// Refuse destinations that would truncate one of the live files
    fn check_backup_destination(&self, dest: &Path) -> Result<()> {
        let dest_index = index::index_path(dest);
        let live = [self.data_path.as_path(), self.index_path.as_path()];

        for target in [dest, dest_index.as_path()] {
            if live.iter().any(|path| same_file(target, path)) {
                return Err(LineStoreError::InvalidBackupPath(dest.to_path_buf()));
            }
        }
        Ok(())
    }
}

/// Copy both live files to `dest` and `dest` + ".idx", syncing each copy
pub(super) fn copy_store_files(files: &Files, dest: &Path) -> Result<BackupReport> {
    let dest_index = index::index_path(dest);

    let (data_bytes, data_crc) = copy_file(&files.data, dest)
        .context(|| format!("failed to back up data file to {}", dest.display()))?;
    let (index_bytes, index_crc) = copy_file(&files.index, &dest_index)
        .context(|| format!("failed to back up index file to {}", dest_index.display()))?;

    Ok(BackupReport {
        data_path: dest.to_path_buf(),
        index_path: dest_index,
        data_bytes,
        index_bytes,
        data_crc,
        index_crc,
    })
}

/// Stream `src` into a truncated `dest`, returning (bytes, crc32)
fn copy_file(src: &File, dest: &Path) -> io::Result<(u64, u32)> {
    let mut out = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)?;

    let mut reader = FileCursor::new(src);
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        out.write_all(&buf[..n])?;
        total += n as u64;
    }

    out.sync_all()?;
    Ok((total, hasher.finalize()))
}

/// Path equality, falling back to canonical paths when both exist
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
