//! Per-file records in the PAK index.

use super::footer::Footer;
use super::version::Version;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// A compression block: a byte range inside the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: u64,
    pub end: u64,
}

/// Physical descriptor for one file in the archive.
///
/// Record layout is version-gated:
/// - offset, compressed size, uncompressed size: u64 each
/// - compression slot: u8 on V8A, u32 otherwise; 0 = uncompressed, a
///   nonzero value `v` names footer slot `v - 1`
/// - timestamp: u64 (V1 only)
/// - hash: 20 bytes
/// - blocks: u32 count + `(start, end)` u64 pairs, present iff the entry is
///   compressed and the revision is V3+
/// - flags byte and compression-block size: V3+
#[derive(Debug, Clone)]
pub struct Entry {
    pub offset: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub compression_slot: Option<u32>,
    pub timestamp: Option<u64>,
    pub hash: [u8; 20],
    pub blocks: Option<Vec<Block>>,
    pub flags: u8,
    pub compression_block_size: u32,
}

impl Entry {
    /// Flag bit 0: the file's data is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags & 1 != 0
    }

    /// Flag bit 1: the record marks a deleted file.
    pub fn is_deleted(&self) -> bool {
        (self.flags >> 1) & 1 != 0
    }

    /// Stand-in for files listed by a full directory index, whose physical
    /// descriptors live in an encoded pool this crate does not decode.
    pub(super) fn placeholder() -> Self {
        Entry {
            offset: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            compression_slot: None,
            timestamp: None,
            hash: [0; 20],
            blocks: None,
            flags: 0,
            compression_block_size: 0,
        }
    }
}

pub(super) fn read(c: &mut Cursor<'_>, footer: &Footer) -> Result<Entry> {
    let offset = c.read_u64()?;
    let compressed_size = c.read_u64()?;
    let uncompressed_size = c.read_u64()?;

    let slot_raw = if footer.version == Version::V8A {
        c.read_u8()? as u32
    } else {
        c.read_u32()?
    };
    // One-based on the wire; zero means no compression.
    let compression_slot = slot_raw.checked_sub(1);
    if let Some(slot) = compression_slot {
        if slot as usize >= footer.compression.len() {
            return Err(Error::InvalidRecord(format!(
                "compression slot {slot} out of range ({} methods declared)",
                footer.compression.len()
            )));
        }
    }

    let timestamp = if footer.version.has_timestamps() {
        Some(c.read_u64()?)
    } else {
        None
    };

    let hash = c.read_array::<20>()?;

    let blocks = if footer.version.has_compression_blocks() && compression_slot.is_some() {
        let count = c.read_u32()? as usize;
        if count.saturating_mul(16) > c.remaining() {
            return Err(Error::Truncated {
                needed: count * 16,
                remaining: c.remaining(),
            });
        }
        let mut blocks = Vec::with_capacity(count);
        for _ in 0..count {
            let start = c.read_u64()?;
            let end = c.read_u64()?;
            if end < start {
                return Err(Error::InvalidRecord(format!(
                    "compression block ends before it starts ({start}..{end})"
                )));
            }
            blocks.push(Block { start, end });
        }
        Some(blocks)
    } else {
        None
    };

    let (flags, compression_block_size) = if footer.version.has_compression_blocks() {
        (c.read_u8()?, c.read_u32()?)
    } else {
        (0, 0)
    };

    Ok(Entry {
        offset,
        compressed_size,
        uncompressed_size,
        compression_slot,
        timestamp,
        hash,
        blocks,
        flags,
        compression_block_size,
    })
}
