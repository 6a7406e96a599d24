//! Index entry definitions

use std::fs::File;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{IoResultExt, LineStoreError, Result};
use crate::io::read_full_at;

use super::INDEX_ENTRY_SIZE;

/// A single 16-byte entry in the index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Line number of the record
    pub ordinal: u64,

    /// Byte offset of the record's tag in the data file
    pub offset: u64,
}

impl IndexEntry {
    pub fn new(ordinal: u64, offset: u64) -> Self {
        Self { ordinal, offset }
    }

    /// Byte position of the entry for `ordinal` in the index file
    pub fn position(ordinal: u64) -> u64 {
        ordinal * INDEX_ENTRY_SIZE
    }

    /// Encode as ordinal (8, LE) + offset (8, LE)
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(INDEX_ENTRY_SIZE as usize);
        buf.put_u64_le(self.ordinal);
        buf.put_u64_le(self.offset);
        buf.freeze()
    }

    /// Decode from exactly 16 bytes
    pub fn decode(bytes: &[u8; INDEX_ENTRY_SIZE as usize]) -> Self {
        let mut buf = &bytes[..];
        let ordinal = buf.get_u64_le();
        let offset = buf.get_u64_le();
        Self { ordinal, offset }
    }
}

/// Read the entry for `ordinal` by its position in the index file
pub fn read_entry(file: &File, ordinal: u64) -> Result<IndexEntry> {
    let position = IndexEntry::position(ordinal);
    let mut bytes = [0u8; INDEX_ENTRY_SIZE as usize];
    let n = read_full_at(file, &mut bytes, position)
        .context(|| format!("failed to read index entry at offset {}", position))?;
    if n < bytes.len() {
        return Err(LineStoreError::TruncatedIndexEntry { ordinal });
    }
    Ok(IndexEntry::decode(&bytes))
}
