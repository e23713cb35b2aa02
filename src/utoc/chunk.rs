//! Raw chunk records: ids, offset/length pairs, compressed-block entries
//! and per-chunk metadata.
//!
//! The fixed-size records are kept as their wire bytes; accessors decode the
//! bit-packed sub-fields on demand, so re-composing a record from its parts
//! reproduces the original bytes.

use byteorder::{ByteOrder, LittleEndian};

/// Payload type carried in the low 6 bits of chunk id byte 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    Invalid,
    ExportBundleData,
    BulkData,
    OptionalBulkData,
    MemoryMappedBulkData,
    ScriptObjects,
    ContainerHeader,
    ExternalFile,
    ShaderCodeLibrary,
    ShaderCode,
    PackageStoreEntry,
    DerivedData,
    EditorDerivedData,
    PackageResource,
}

impl ChunkType {
    fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            0 => ChunkType::Invalid,
            1 => ChunkType::ExportBundleData,
            2 => ChunkType::BulkData,
            3 => ChunkType::OptionalBulkData,
            4 => ChunkType::MemoryMappedBulkData,
            5 => ChunkType::ScriptObjects,
            6 => ChunkType::ContainerHeader,
            7 => ChunkType::ExternalFile,
            8 => ChunkType::ShaderCodeLibrary,
            9 => ChunkType::ShaderCode,
            10 => ChunkType::PackageStoreEntry,
            11 => ChunkType::DerivedData,
            12 => ChunkType::EditorDerivedData,
            13 => ChunkType::PackageResource,
            _ => return None,
        })
    }
}

/// 12-byte chunk identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId([u8; 12]);

impl ChunkId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ChunkId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// 64-bit id in bytes 0–7.
    pub fn id(&self) -> u64 {
        LittleEndian::read_u64(&self.0[0..8])
    }

    /// 16-bit index in bytes 8–9.
    pub fn index(&self) -> u16 {
        LittleEndian::read_u16(&self.0[8..10])
    }

    /// Raw 6-bit chunk type; values outside the enumerated set are kept
    /// as-is and only fail to map in [`chunk_type`](ChunkId::chunk_type).
    pub fn chunk_type_raw(&self) -> u8 {
        self.0[10] & 0x3F
    }

    pub fn chunk_type(&self) -> Option<ChunkType> {
        ChunkType::from_raw(self.chunk_type_raw())
    }

    /// Bit 6 of byte 11: the chunk embeds version info.
    pub fn has_version_info(&self) -> bool {
        self.0[11] & (1 << 6) != 0
    }
}

/// 10-byte record locating a chunk in the data file: 40-bit offset followed
/// by 40-bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetAndLength([u8; 10]);

impl OffsetAndLength {
    pub fn from_bytes(bytes: [u8; 10]) -> Self {
        OffsetAndLength(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 10] {
        &self.0
    }

    pub fn offset(&self) -> u64 {
        LittleEndian::read_uint(&self.0[0..5], 5)
    }

    pub fn length(&self) -> u64 {
        LittleEndian::read_uint(&self.0[5..10], 5)
    }
}

/// 12-byte compressed-block record: 40-bit offset, 24-bit compressed and
/// uncompressed sizes, 8-bit compression-method index (0 = uncompressed,
/// otherwise 1-based into the method table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedBlockEntry([u8; 12]);

impl CompressedBlockEntry {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        CompressedBlockEntry(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    pub fn offset(&self) -> u64 {
        LittleEndian::read_uint(&self.0[0..5], 5)
    }

    pub fn compressed_size(&self) -> u32 {
        LittleEndian::read_uint(&self.0[5..8], 3) as u32
    }

    pub fn uncompressed_size(&self) -> u32 {
        LittleEndian::read_uint(&self.0[8..11], 3) as u32
    }

    pub fn compression_method_index(&self) -> u8 {
        self.0[11]
    }
}

/// Chunk content hash; the width changed when the TOC replaced its original
/// hash with the shorter io hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMetaHash {
    /// 32-byte hash, versions before `ReplaceIoChunkHashWithIoHash`.
    Full([u8; 32]),
    /// 20-byte hash, `ReplaceIoChunkHashWithIoHash` and later.
    Io([u8; 20]),
}

/// Per-chunk metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    pub hash: ChunkMetaHash,
    pub flags: u8,
}

impl ChunkMeta {
    pub const COMPRESSED: u8 = 1 << 0;
    pub const MEMORY_MAPPED: u8 = 1 << 1;

    pub fn is_compressed(&self) -> bool {
        self.flags & Self::COMPRESSED != 0
    }

    pub fn is_memory_mapped(&self) -> bool {
        self.flags & Self::MEMORY_MAPPED != 0
    }
}
