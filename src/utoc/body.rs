//! TOC body parsing: the variable-length sections following the header.
//!
//! Sections are laid out contiguously and consumed in a fixed order, each
//! sized by header fields:
//! 1. chunk ids (`entry_count` × 12)
//! 2. offsets and lengths (`entry_count` × 10)
//! 3. perfect-hash seeds and overflow indices (version-gated)
//! 4. compressed-block entries (`compressed_block_entry_count` × 12)
//! 5. compression-method names (count × fixed length, NUL-padded)
//! 6. signatures (only when Signed; skipped)
//! 7. directory index (only when Indexed with a nonzero size)
//! 8. chunk metadata (`entry_count` records, shape version-gated)
//!
//! An Encrypted container is refused before the signature section.

use log::{debug, trace};

use super::chunk::{ChunkId, ChunkMeta, ChunkMetaHash, CompressedBlockEntry, OffsetAndLength};
use super::directory::{self, DirectoryIndex};
use super::header::TocHeader;
use super::TocVersion;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

#[derive(Debug)]
pub(super) struct TocBody {
    pub chunk_ids: Vec<ChunkId>,
    pub offsets_and_lengths: Vec<OffsetAndLength>,
    pub perfect_hash_seeds: Vec<i32>,
    pub chunks_without_perfect_hash: Vec<i32>,
    pub compressed_blocks: Vec<CompressedBlockEntry>,
    pub compression_methods: Vec<String>,
    pub directory_index: DirectoryIndex,
    pub chunk_metas: Vec<ChunkMeta>,
}

pub(super) fn read(c: &mut Cursor<'_>, header: &TocHeader) -> Result<TocBody> {
    let entry_count = header.entry_count as usize;

    let mut chunk_ids = Vec::with_capacity(entry_count.min(c.remaining() / 12));
    for _ in 0..entry_count {
        chunk_ids.push(ChunkId::from_bytes(c.read_array::<12>()?));
    }

    let mut offsets_and_lengths = Vec::with_capacity(entry_count.min(c.remaining() / 10));
    for _ in 0..entry_count {
        offsets_and_lengths.push(OffsetAndLength::from_bytes(c.read_array::<10>()?));
    }

    let mut perfect_hash_seeds = Vec::new();
    let mut chunks_without_perfect_hash = Vec::new();
    if header.version >= TocVersion::PerfectHash {
        for _ in 0..header.perfect_hash_seeds_count {
            perfect_hash_seeds.push(c.read_i32()?);
        }
    }
    if header.version >= TocVersion::PerfectHashWithOverflow {
        for _ in 0..header.chunks_without_perfect_hash_count {
            chunks_without_perfect_hash.push(c.read_i32()?);
        }
    }

    let block_count = header.compressed_block_entry_count as usize;
    let mut compressed_blocks = Vec::with_capacity(block_count.min(c.remaining() / 12));
    for _ in 0..block_count {
        compressed_blocks.push(CompressedBlockEntry::from_bytes(c.read_array::<12>()?));
    }

    let name_length = header.compression_method_name_length as usize;
    let mut compression_methods = Vec::with_capacity(header.compression_method_name_count as usize);
    for _ in 0..header.compression_method_name_count {
        let raw = c.take(name_length)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        compression_methods.push(String::from_utf8_lossy(&raw[..end]).into_owned());
    }
    trace!("toc compression methods: {compression_methods:?}");

    if header.is_encrypted() {
        return Err(Error::EncryptedContainer {
            encryption_guid: Some(u128::from_le_bytes(header.encryption_key_guid)),
        });
    }

    if header.is_signed() {
        let signature_size = c.read_u32()? as usize;
        // Both signature blobs plus one trailing size field, then one SHA-1
        // per compressed block.
        c.skip(signature_size.saturating_mul(2).saturating_add(4))?;
        c.skip(block_count.saturating_mul(20))?;
        debug!("skipped signature section ({signature_size}-byte signatures)");
    }

    let directory_index = if header.is_indexed() && header.directory_index_size > 0 {
        let sub = c.take(header.directory_index_size as usize)?;
        directory::read(sub)?
    } else {
        DirectoryIndex::default()
    };

    let mut chunk_metas = Vec::with_capacity(entry_count.min(c.remaining() / 24));
    for _ in 0..entry_count {
        if header.version >= TocVersion::ReplaceIoChunkHashWithIoHash {
            let hash = c.read_array::<20>()?;
            let flags = c.read_u8()?;
            c.skip(3)?;
            chunk_metas.push(ChunkMeta {
                hash: ChunkMetaHash::Io(hash),
                flags,
            });
        } else {
            let hash = c.read_array::<32>()?;
            let flags = c.read_u8()?;
            chunk_metas.push(ChunkMeta {
                hash: ChunkMetaHash::Full(hash),
                flags,
            });
        }
    }

    Ok(TocBody {
        chunk_ids,
        offsets_and_lengths,
        perfect_hash_seeds,
        chunks_without_perfect_hash,
        compressed_blocks,
        compression_methods,
        directory_index,
        chunk_metas,
    })
}
