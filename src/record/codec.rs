//! Record codec
//!
//! Encoding and validated decoding of single records.

use std::fs::File;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{IoResultExt, LineStoreError, Result};
use crate::io::read_full_at;

use super::{RecordTag, RECORD_HEADER_SIZE};

/// Encode a value as a complete record
///
/// Format: tag (1) + len (4, LE) + payload
pub fn encode_record(value: &[u8]) -> Result<Bytes> {
    let len = u32::try_from(value.len()).map_err(|_| LineStoreError::ValueTooLarge {
        len: value.len(),
        limit: u32::MAX,
    })?;

    let mut buf = BytesMut::with_capacity(RECORD_HEADER_SIZE + value.len());
    buf.put_u8(RecordTag::Active as u8);
    buf.put_u32_le(len);
    buf.put_slice(value);
    Ok(buf.freeze())
}

/// Decode a record header, returning the payload length
///
/// `ordinal` and `offset` only feed the error if the tag is invalid.
pub fn decode_header(header: &[u8; RECORD_HEADER_SIZE], ordinal: u64, offset: u64) -> Result<u32> {
    let mut buf = &header[..];
    let tag = buf.get_u8();
    if RecordTag::from_byte(tag).is_none() {
        return Err(LineStoreError::InvalidTag {
            ordinal,
            offset,
            tag,
        });
    }
    Ok(buf.get_u32_le())
}

/// Read the record for `ordinal` that starts at `offset`
///
/// Rejects lengths above `max_len` before allocating the payload buffer.
pub fn read_record_at(file: &File, offset: u64, ordinal: u64, max_len: u32) -> Result<Vec<u8>> {
    let mut header = [0u8; RECORD_HEADER_SIZE];
    let n = read_full_at(file, &mut header, offset)
        .context(|| format!("failed to read record header at line {}", ordinal))?;
    if n < RECORD_HEADER_SIZE {
        return Err(LineStoreError::TruncatedHeader { ordinal, offset });
    }

    let len = decode_header(&header, ordinal, offset)?;
    if len > max_len {
        return Err(LineStoreError::RecordTooLarge {
            ordinal,
            len,
            limit: max_len,
        });
    }

    let mut value = vec![0u8; len as usize];
    let read = read_full_at(file, &mut value, offset + RECORD_HEADER_SIZE as u64)
        .context(|| format!("failed to read value at line {}", ordinal))?;
    if read < value.len() {
        return Err(LineStoreError::TruncatedRecord {
            ordinal,
            expected: len,
            read,
        });
    }

    Ok(value)
}
