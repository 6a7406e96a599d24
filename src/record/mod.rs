//! Record Log Module
//!
//! Durable storage of raw byte payloads, addressed only by append order.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Record 0                             │
//! │ ┌─────────┬─────────┬──────────────┐ │
//! │ │ Tag (1) │ Len (4) │ Payload      │ │
//! │ └─────────┴─────────┴──────────────┘ │
//! ├──────────────────────────────────────┤
//! │ Record 1                             │
//! │ ┌─────────┬─────────┬──────────────┐ │
//! │ │ Tag (1) │ Len (4) │ Payload      │ │
//! │ └─────────┴─────────┴──────────────┘ │
//! └──────────────────────────────────────┘
//! ```
//!
//! No header, footer or padding. `Len` is little-endian. A record's position
//! in the file is its line number.

mod codec;
mod scanner;

pub use codec::{decode_header, encode_record, read_record_at};
pub use scanner::{RecordScanner, ScannedRecord};

/// Tag (1) + Len (4)
pub const RECORD_HEADER_SIZE: usize = 5;

/// Record discriminant stored in the first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordTag {
    /// A live record. The only variant written today; other values are
    /// reserved and treated as corruption.
    Active = 0,
}

impl RecordTag {
    /// Decode a tag byte, `None` for reserved values
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Active),
            _ => None,
        }
    }
}
