//! Tests for the record and index codecs
//!
//! These tests verify:
//! - Record and index entry byte layouts
//! - Header validation (reserved tags)
//! - Positional record reads and their failure modes
//! - The forward scanner (offsets, ordinals, corruption, ceiling)
//! - FileCursor positional reads

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use linestore::index::{self, IndexEntry, INDEX_ENTRY_SIZE};
use linestore::io::FileCursor;
use linestore::record::{
    decode_header, encode_record, read_record_at, RecordScanner, RecordTag, RECORD_HEADER_SIZE,
};
use linestore::LineStoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("records.db");
    (temp_dir, path)
}

fn write_records(path: &Path, values: &[&[u8]]) {
    let mut bytes = Vec::new();
    for value in values {
        bytes.extend_from_slice(&encode_record(value).unwrap());
    }
    fs::write(path, bytes).unwrap();
}

// =============================================================================
// Record Codec Tests
// =============================================================================

#[test]
fn test_encode_record_layout() {
    let encoded = encode_record(b"hello").unwrap();

    assert_eq!(encoded.len(), RECORD_HEADER_SIZE + 5);
    assert_eq!(encoded[0], RecordTag::Active as u8);
    assert_eq!(&encoded[1..5], &5u32.to_le_bytes());
    assert_eq!(&encoded[5..], b"hello");
}

#[test]
fn test_encode_empty_record() {
    let encoded = encode_record(b"").unwrap();

    assert_eq!(&encoded[..], &[0, 0, 0, 0, 0]);
}

#[test]
fn test_decode_header() {
    let header = [0u8, 0x10, 0x01, 0, 0];

    assert_eq!(decode_header(&header, 0, 0).unwrap(), 0x0110);
}

#[test]
fn test_decode_header_rejects_reserved_tag() {
    let header = [1u8, 4, 0, 0, 0];

    let result = decode_header(&header, 7, 42);

    assert!(matches!(
        result,
        Err(LineStoreError::InvalidTag { ordinal: 7, offset: 42, tag: 1 })
    ));
}

#[test]
fn test_record_tag_from_byte() {
    assert_eq!(RecordTag::from_byte(0), Some(RecordTag::Active));
    assert_eq!(RecordTag::from_byte(1), None);
    assert_eq!(RecordTag::from_byte(0xff), None);
}

// =============================================================================
// Positional Read Tests
// =============================================================================

#[test]
fn test_read_record_at() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[b"first", b"second"]);
    let file = File::open(&path).unwrap();

    assert_eq!(read_record_at(&file, 0, 0, 1024).unwrap(), b"first");
    assert_eq!(read_record_at(&file, 10, 1, 1024).unwrap(), b"second");
}

#[test]
fn test_read_record_at_past_end() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[b"only"]);
    let file = File::open(&path).unwrap();

    let result = read_record_at(&file, 100, 3, 1024);

    assert!(matches!(
        result,
        Err(LineStoreError::TruncatedHeader { ordinal: 3, offset: 100 })
    ));
}

#[test]
fn test_read_record_at_over_ceiling() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[&[7u8; 64]]);
    let file = File::open(&path).unwrap();

    let result = read_record_at(&file, 0, 0, 63);

    assert!(matches!(
        result,
        Err(LineStoreError::RecordTooLarge { ordinal: 0, len: 64, limit: 63 })
    ));
}

#[test]
fn test_read_record_at_short_payload() {
    let (_temp, path) = setup_temp_file();
    fs::write(&path, [0u8, 10, 0, 0, 0, b'a', b'b', b'c']).unwrap();
    let file = File::open(&path).unwrap();

    let result = read_record_at(&file, 0, 0, 1024);

    assert!(matches!(
        result,
        Err(LineStoreError::TruncatedRecord { ordinal: 0, expected: 10, read: 3 })
    ));
}

// =============================================================================
// Index Entry Tests
// =============================================================================

#[test]
fn test_index_entry_layout() {
    let entry = IndexEntry::new(3, 0x0102_0304);

    let encoded = entry.encode();

    assert_eq!(encoded.len(), INDEX_ENTRY_SIZE as usize);
    assert_eq!(&encoded[0..8], &3u64.to_le_bytes());
    assert_eq!(&encoded[8..16], &0x0102_0304u64.to_le_bytes());
}

#[test]
fn test_index_entry_decode() {
    let mut bytes = [0u8; 16];
    bytes[0..8].copy_from_slice(&9u64.to_le_bytes());
    bytes[8..16].copy_from_slice(&12345u64.to_le_bytes());

    assert_eq!(IndexEntry::decode(&bytes), IndexEntry::new(9, 12345));
}

#[test]
fn test_index_entry_position() {
    assert_eq!(IndexEntry::position(0), 0);
    assert_eq!(IndexEntry::position(1), 16);
    assert_eq!(IndexEntry::position(10), 160);
}

#[test]
fn test_read_index_entry_by_position() {
    let (_temp, path) = setup_temp_file();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&IndexEntry::new(0, 0).encode());
    bytes.extend_from_slice(&IndexEntry::new(1, 11).encode());
    fs::write(&path, bytes).unwrap();
    let file = File::open(&path).unwrap();

    assert_eq!(index::read_entry(&file, 1).unwrap(), IndexEntry::new(1, 11));
    assert!(matches!(
        index::read_entry(&file, 2),
        Err(LineStoreError::TruncatedIndexEntry { ordinal: 2 })
    ));
}

#[test]
fn test_index_path_appends_suffix() {
    assert_eq!(index::index_path(Path::new("db")), PathBuf::from("db.idx"));
    assert_eq!(
        index::index_path(Path::new("dir/store.db")),
        PathBuf::from("dir/store.db.idx")
    );
}

#[test]
fn test_expected_size() {
    assert_eq!(index::expected_size(0), 0);
    assert_eq!(index::expected_size(5), 80);
}

// =============================================================================
// Scanner Tests
// =============================================================================

#[test]
fn test_scanner_yields_ordinals_and_offsets() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[b"a", b"bc", b""]);
    let file = File::open(&path).unwrap();

    let records: Vec<_> = RecordScanner::new(&file, 1024)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!((records[0].ordinal, records[0].offset), (0, 0));
    assert_eq!((records[1].ordinal, records[1].offset), (1, 6));
    assert_eq!((records[2].ordinal, records[2].offset), (2, 13));
    assert_eq!(records[1].value, b"bc");
    assert!(records[2].value.is_empty());
}

#[test]
fn test_scanner_empty_file() {
    let (_temp, path) = setup_temp_file();
    fs::write(&path, b"").unwrap();
    let file = File::open(&path).unwrap();

    assert_eq!(RecordScanner::new(&file, 1024).unwrap().count_records().unwrap(), 0);
    assert_eq!(RecordScanner::new(&file, 1024).unwrap().count(), 0);
}

#[test]
fn test_scanner_count_records() {
    let (_temp, path) = setup_temp_file();
    let big = vec![1u8; 100_000];
    write_records(&path, &[b"x", big.as_slice(), b"yz"]);
    let file = File::open(&path).unwrap();

    let scanner = RecordScanner::new(&file, 1024).unwrap();
    assert_eq!(scanner.file_len(), 6 + 100_005 + 7);
    // Counting skips payloads, so the ceiling does not apply
    assert_eq!(scanner.count_records().unwrap(), 3);
}

#[test]
fn test_scanner_detects_invalid_tag() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[b"ok", b"bad"]);
    let mut bytes = fs::read(&path).unwrap();
    bytes[7] = 2;
    fs::write(&path, bytes).unwrap();
    let file = File::open(&path).unwrap();

    let result = RecordScanner::new(&file, 1024).unwrap().count_records();

    assert!(matches!(
        result,
        Err(LineStoreError::InvalidTag { ordinal: 1, offset: 7, tag: 2 })
    ));
}

#[test]
fn test_scanner_detects_overrun() {
    let (_temp, path) = setup_temp_file();
    let mut bytes = encode_record(b"ok").unwrap().to_vec();
    bytes.extend_from_slice(&[0, 50, 0, 0, 0, 1, 2]);
    fs::write(&path, bytes).unwrap();
    let file = File::open(&path).unwrap();

    let result = RecordScanner::new(&file, 1024).unwrap().count_records();

    assert!(matches!(
        result,
        Err(LineStoreError::RecordOverrun { ordinal: 1, offset: 7, len: 50, file_len: 14 })
    ));
}

#[test]
fn test_scanner_detects_truncated_header() {
    let (_temp, path) = setup_temp_file();
    let mut bytes = encode_record(b"ok").unwrap().to_vec();
    bytes.extend_from_slice(&[0, 1]);
    fs::write(&path, bytes).unwrap();
    let file = File::open(&path).unwrap();

    let result = RecordScanner::new(&file, 1024).unwrap().count_records();

    assert!(matches!(
        result,
        Err(LineStoreError::TruncatedHeader { ordinal: 1, offset: 7 })
    ));
}

#[test]
fn test_scanner_enforces_ceiling_when_reading() {
    let (_temp, path) = setup_temp_file();
    write_records(&path, &[b"small", &[0u8; 32]]);
    let file = File::open(&path).unwrap();

    let mut scanner = RecordScanner::new(&file, 16).unwrap();

    assert_eq!(scanner.next().unwrap().unwrap().value, b"small");
    assert!(matches!(
        scanner.next(),
        Some(Err(LineStoreError::RecordTooLarge { ordinal: 1, len: 32, limit: 16 }))
    ));
    assert!(scanner.next().is_none());
}

// =============================================================================
// FileCursor Tests
// =============================================================================

#[test]
fn test_file_cursor_reads_independently() {
    let (_temp, path) = setup_temp_file();
    fs::write(&path, b"0123456789").unwrap();
    let file = File::open(&path).unwrap();

    let mut first = FileCursor::new(&file);
    let mut second = FileCursor::new(&file);
    let mut buf = [0u8; 4];

    first.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"0123");
    second.seek(SeekFrom::Start(6)).unwrap();
    second.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"6789");
    first.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"4567");
    assert_eq!(first.position(), 8);
}

#[test]
fn test_file_cursor_seek_end_and_current() {
    let (_temp, path) = setup_temp_file();
    fs::write(&path, b"0123456789").unwrap();
    let file = File::open(&path).unwrap();
    let mut cursor = FileCursor::new(&file);

    assert_eq!(cursor.seek(SeekFrom::End(-3)).unwrap(), 7);
    assert_eq!(cursor.seek(SeekFrom::Current(1)).unwrap(), 8);
    assert!(cursor.seek(SeekFrom::Current(-20)).is_err());

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b"89");
}
