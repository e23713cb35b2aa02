//! Read-only IoStore table-of-contents (UTOC) reader.
//!
//! A UTOC file is the metadata companion to a UCAS data file: a fixed
//! 144-byte header followed by contiguous sections describing every chunk's
//! id, placement, compression and (when indexed) logical path. The whole
//! file is read into memory and decoded atomically at open time.

mod body;
mod chunk;
mod directory;
mod header;

pub use chunk::{
    ChunkId, ChunkMeta, ChunkMetaHash, ChunkType, CompressedBlockEntry, OffsetAndLength,
};
pub use directory::{DirectoryEntry, DirectoryIndex, FileEntry};
pub use header::{ContainerFlags, TocHeader, TocVersion, HEADER_SIZE, MAGIC};

use std::cell::OnceCell;
use std::path::Path;

use log::info;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Reader over a decoded UTOC file.
///
/// Built atomically by [`open`](UtocReader::open); afterwards every query is
/// a pure read over the frozen model. A reader is single-threaded; use one
/// instance per file.
#[derive(Debug)]
pub struct UtocReader {
    header: TocHeader,
    body: body::TocBody,
    files: OnceCell<Vec<(String, u32)>>,
}

impl UtocReader {
    /// Open a UTOC file from disk.
    ///
    /// The file is read eagerly and the handle released before returning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("opening UTOC file: {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a UTOC file from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                needed: HEADER_SIZE,
                remaining: bytes.len(),
            });
        }
        let mut c = Cursor::new(bytes);
        let header = header::read(&mut c)?;
        let body = body::read(&mut c, &header)?;
        info!(
            "UTOC decoded: {:?}, {} chunks, {} directory-index bytes",
            header.version, header.entry_count, header.directory_index_size
        );
        Ok(Self {
            header,
            body,
            files: OnceCell::new(),
        })
    }

    /// The decoded TOC header.
    pub fn header(&self) -> &TocHeader {
        &self.header
    }

    /// The decoded directory index; empty when the container is not indexed.
    pub fn directory_index(&self) -> &DirectoryIndex {
        &self.body.directory_index
    }

    /// Full file paths (mount point included), in directory-tree order.
    pub fn all_file_paths(&self) -> Vec<&str> {
        self.files()
            .iter()
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// `(full path, chunk index)` pairs, in directory-tree order.
    pub fn files(&self) -> &[(String, u32)] {
        // The traversal already ran during open; it cannot fail here.
        self.files
            .get_or_init(|| self.body.directory_index.collect_files().unwrap_or_default())
    }

    /// The path associated with a chunk index, when the index lists one.
    pub fn path_for_chunk(&self, chunk_index: u32) -> Option<&str> {
        self.files()
            .iter()
            .find(|(_, user_data)| *user_data == chunk_index)
            .map(|(path, _)| path.as_str())
    }

    /// 12-byte chunk ids, one per TOC entry.
    pub fn chunk_ids(&self) -> &[ChunkId] {
        &self.body.chunk_ids
    }

    /// Chunk placements in the data file, parallel to the chunk ids.
    pub fn offsets_and_lengths(&self) -> &[OffsetAndLength] {
        &self.body.offsets_and_lengths
    }

    /// Perfect-hash seeds (empty before the PerfectHash version).
    pub fn perfect_hash_seeds(&self) -> &[i32] {
        &self.body.perfect_hash_seeds
    }

    /// Chunk indices that fell out of the perfect hash (empty before the
    /// PerfectHashWithOverflow version).
    pub fn chunks_without_perfect_hash(&self) -> &[i32] {
        &self.body.chunks_without_perfect_hash
    }

    /// Compressed-block descriptors for the data file.
    pub fn compressed_blocks(&self) -> &[CompressedBlockEntry] {
        &self.body.compressed_blocks
    }

    /// Compression-method names referenced by block entries (1-based).
    pub fn compression_methods(&self) -> &[String] {
        &self.body.compression_methods
    }

    /// Per-chunk metadata, parallel to the chunk ids.
    pub fn chunk_metas(&self) -> &[ChunkMeta] {
        &self.body.chunk_metas
    }
}
