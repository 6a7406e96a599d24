//! Record Scanner
//!
//! Sequential decode of the data file from the first record to EOF. Open-time
//! recovery, forward listing and polish all walk the log through this type.

use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::{IoResultExt, LineStoreError, Result};
use crate::io::FileCursor;

use super::{decode_header, RECORD_HEADER_SIZE};

/// A record decoded by the scanner, tagged with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Line number (0-based position in the log)
    pub ordinal: u64,
    /// Byte offset of the record's tag in the data file
    pub offset: u64,
    /// Payload bytes
    pub value: Vec<u8>,
}

/// Iterator over data file records in file order
pub struct RecordScanner<'a> {
    reader: BufReader<FileCursor<'a>>,
    /// File size when the scan started; records must end at or before it
    file_len: u64,
    /// Offset of the next record
    offset: u64,
    /// Line number of the next record
    ordinal: u64,
    max_len: u32,
    done: bool,
}

impl<'a> RecordScanner<'a> {
    /// Create a scanner positioned at the first record
    ///
    /// Payloads longer than `max_len` are reported as corruption when read.
    pub fn new(file: &'a File, max_len: u32) -> Result<Self> {
        let file_len = file
            .metadata()
            .context(|| "failed to stat data file")?
            .len();

        Ok(Self {
            reader: BufReader::new(FileCursor::new(file)),
            file_len,
            offset: 0,
            ordinal: 0,
            max_len,
            done: false,
        })
    }

    /// Size of the data file at the start of the scan
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Count the remaining records, skipping over payloads without reading them
    ///
    /// Validates every tag and every declared length against the file size.
    pub fn count_records(mut self) -> Result<u64> {
        while let Some(len) = self.next_header()? {
            self.reader
                .seek_relative(i64::from(len))
                .context(|| format!("failed to skip value at line {}", self.ordinal))?;
            self.advance(len);
        }
        Ok(self.ordinal)
    }

    /// Read the next header, `None` at a clean end of file
    fn next_header(&mut self) -> Result<Option<u32>> {
        if self.offset >= self.file_len {
            return Ok(None);
        }

        if self.file_len - self.offset < RECORD_HEADER_SIZE as u64 {
            return Err(LineStoreError::TruncatedHeader {
                ordinal: self.ordinal,
                offset: self.offset,
            });
        }

        let mut header = [0u8; RECORD_HEADER_SIZE];
        self.reader
            .read_exact(&mut header)
            .context(|| format!("failed to read record header at line {}", self.ordinal))?;

        let len = decode_header(&header, self.ordinal, self.offset)?;

        let end = self.offset + RECORD_HEADER_SIZE as u64 + u64::from(len);
        if end > self.file_len {
            return Err(LineStoreError::RecordOverrun {
                ordinal: self.ordinal,
                offset: self.offset,
                len,
                file_len: self.file_len,
            });
        }

        Ok(Some(len))
    }

    fn read_next(&mut self) -> Result<Option<ScannedRecord>> {
        let Some(len) = self.next_header()? else {
            return Ok(None);
        };

        if len > self.max_len {
            return Err(LineStoreError::RecordTooLarge {
                ordinal: self.ordinal,
                len,
                limit: self.max_len,
            });
        }

        let mut value = vec![0u8; len as usize];
        self.reader
            .read_exact(&mut value)
            .context(|| format!("failed to read value at line {}", self.ordinal))?;

        let record = ScannedRecord {
            ordinal: self.ordinal,
            offset: self.offset,
            value,
        };
        self.advance(len);
        Ok(Some(record))
    }

    fn advance(&mut self, len: u32) {
        self.offset += RECORD_HEADER_SIZE as u64 + u64::from(len);
        self.ordinal += 1;
    }
}

impl Iterator for RecordScanner<'_> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            // Stop after the first error; the position is no longer trustworthy
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
