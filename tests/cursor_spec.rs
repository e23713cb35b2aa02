//! Wire-primitive tests: engine strings, optional indices, packed reads.

use ue_container_reader::cursor::{Cursor, NONE_INDEX};
use ue_container_reader::Error;

fn ascii_record(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(text.len() as i32 + 1).to_le_bytes());
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    out
}

#[test]
fn ascii_string_length_includes_terminator() {
    for text in ["", "a", "Engine/Content", "../../../"] {
        let record = ascii_record(text);
        assert_eq!(record.len(), 4 + text.len() + 1);
        let mut c = Cursor::new(&record);
        assert_eq!(c.read_string().expect("decode ascii string"), text);
        assert!(c.is_empty(), "length must consume the terminator");
    }
}

#[test]
fn zero_length_string_is_empty() {
    let record = 0i32.to_le_bytes();
    let mut c = Cursor::new(&record);
    assert_eq!(c.read_string().expect("decode empty string"), "");
    assert!(c.is_empty());
}

#[test]
fn ascii_string_truncates_at_embedded_nul() {
    let mut record = Vec::new();
    record.extend_from_slice(&8i32.to_le_bytes());
    record.extend_from_slice(b"abc\0defg");
    let mut c = Cursor::new(&record);
    assert_eq!(c.read_string().expect("decode"), "abc");
    assert!(c.is_empty(), "declared length is consumed past the NUL");
}

#[test]
fn utf16_string_decodes_surrogate_pairs() {
    let text = "dir/😀/π";
    let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    let mut record = Vec::new();
    record.extend_from_slice(&(-(units.len() as i32)).to_le_bytes());
    for unit in &units {
        record.extend_from_slice(&unit.to_le_bytes());
    }
    let mut c = Cursor::new(&record);
    assert_eq!(c.read_string().expect("decode utf-16 string"), text);
    assert!(c.is_empty());
}

#[test]
fn string_longer_than_buffer_is_truncated_error() {
    let record = 100i32.to_le_bytes();
    let mut c = Cursor::new(&record);
    match c.read_string() {
        Err(Error::Truncated { needed, remaining }) => {
            assert_eq!(needed, 100);
            assert_eq!(remaining, 0);
        }
        other => panic!("expected Truncated, got {other:?}"),
    }
}

#[test]
fn optional_index_sentinel_is_absent() {
    let mut record = Vec::new();
    record.extend_from_slice(&NONE_INDEX.to_le_bytes());
    record.extend_from_slice(&7u32.to_le_bytes());
    let mut c = Cursor::new(&record);
    assert_eq!(c.read_optional_index().expect("read"), None);
    assert_eq!(c.read_optional_index().expect("read"), Some(7));
}

#[test]
fn packed_reads_zero_extend() {
    let record = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0x12, 0x34, 0x56];
    let mut c = Cursor::new(&record);
    assert_eq!(c.read_packed_u64(5).expect("40-bit read"), 0xEE_DDCC_BBAA);
    assert_eq!(c.read_packed_u64(3).expect("24-bit read"), 0x56_3412);
    assert!(c.is_empty());
}

#[test]
fn boolean_bytes_are_strict() {
    let record = [0u8, 1, 2];
    let mut c = Cursor::new(&record);
    assert!(!c.read_bool().expect("zero is false"));
    assert!(c.read_bool().expect("one is true"));
    match c.read_bool() {
        Err(Error::InvalidRecord(message)) => {
            assert!(message.contains("boolean"), "unexpected message: {message}");
        }
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
}
