//! Positional file access
//!
//! Readers only hold the shared lock, so several of them may touch the same
//! file handle at once. Everything here reads at an explicit offset and never
//! moves the OS cursor that appends rely on.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use crate::config::SyncMode;

/// A `Read + Seek` view over a shared `&File` with its own position
pub struct FileCursor<'a> {
    file: &'a File,
    pos: u64,
}

impl<'a> FileCursor<'a> {
    /// Create a cursor positioned at the start of the file
    pub fn new(file: &'a File) -> Self {
        Self { file, pos: 0 }
    }

    /// Current position of this cursor
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl Read for FileCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = read_at(self.file, buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for FileCursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::Current(delta) => (self.pos, delta),
            SeekFrom::End(delta) => (self.file.metadata()?.len(), delta),
        };

        self.pos = base.checked_add_signed(delta).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        Ok(self.pos)
    }
}

/// Read into `buf` starting at `offset`, stopping early only at EOF.
///
/// Returns the number of bytes read, which is less than `buf.len()` only
/// when the file ends first.
pub fn read_full_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Flush a file to stable storage according to the configured mode
pub fn sync(file: &File, mode: SyncMode) -> io::Result<()> {
    match mode {
        SyncMode::Full => file.sync_all(),
        SyncMode::Data => file.sync_data(),
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}
