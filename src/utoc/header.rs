//! IoStore TOC header parsing.
//!
//! The header is a fixed 144-byte block at offset 0. Every count and size
//! that drives the section decode in [`super::body`] comes from here.

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// 16-byte magic at the start of every UTOC file.
pub const MAGIC: [u8; 16] = *b"-==--==--==--==-";

/// On-disk size of the header; the header also declares it.
pub const HEADER_SIZE: usize = 144;

/// TOC format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TocVersion {
    Initial,
    DirectoryIndex,
    PartitionSize,
    PerfectHash,
    PerfectHashWithOverflow,
    OnDemandMetaData,
    RemovedOnDemandMetaData,
    ReplaceIoChunkHashWithIoHash,
}

impl TryFrom<u8> for TocVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        // 0 is the wire encoding of "invalid" and is rejected like any
        // unknown value.
        Ok(match value {
            1 => TocVersion::Initial,
            2 => TocVersion::DirectoryIndex,
            3 => TocVersion::PartitionSize,
            4 => TocVersion::PerfectHash,
            5 => TocVersion::PerfectHashWithOverflow,
            6 => TocVersion::OnDemandMetaData,
            7 => TocVersion::RemovedOnDemandMetaData,
            8 => TocVersion::ReplaceIoChunkHashWithIoHash,
            _ => return Err(Error::UnsupportedVersion(value as u32)),
        })
    }
}

/// Container property bit set; only bits 0–3 carry meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerFlags(u8);

impl ContainerFlags {
    pub const COMPRESSED: u8 = 1 << 0;
    pub const ENCRYPTED: u8 = 1 << 1;
    pub const SIGNED: u8 = 1 << 2;
    pub const INDEXED: u8 = 1 << 3;

    pub fn from_bits(bits: u8) -> Self {
        ContainerFlags(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED != 0
    }

    pub fn is_encrypted(self) -> bool {
        self.0 & Self::ENCRYPTED != 0
    }

    pub fn is_signed(self) -> bool {
        self.0 & Self::SIGNED != 0
    }

    pub fn is_indexed(self) -> bool {
        self.0 & Self::INDEXED != 0
    }
}

/// Decoded TOC header. Reserved fields are consumed but not kept.
#[derive(Debug, Clone)]
pub struct TocHeader {
    pub version: TocVersion,
    pub header_size: u32,
    pub entry_count: u32,
    pub compressed_block_entry_count: u32,
    pub compressed_block_entry_size: u32,
    pub compression_method_name_count: u32,
    pub compression_method_name_length: u32,
    pub compression_block_size: u32,
    pub directory_index_size: u32,
    pub partition_count: u32,
    pub container_id: u64,
    pub encryption_key_guid: [u8; 16],
    pub container_flags: ContainerFlags,
    pub perfect_hash_seeds_count: u32,
    pub partition_size: u64,
    pub chunks_without_perfect_hash_count: u32,
}

impl TocHeader {
    pub fn is_compressed(&self) -> bool {
        self.container_flags.is_compressed()
    }

    pub fn is_encrypted(&self) -> bool {
        self.container_flags.is_encrypted()
    }

    pub fn is_signed(&self) -> bool {
        self.container_flags.is_signed()
    }

    pub fn is_indexed(&self) -> bool {
        self.container_flags.is_indexed()
    }
}

pub(super) fn read(c: &mut Cursor<'_>) -> Result<TocHeader> {
    let magic = c.read_array::<16>()?;
    if magic != MAGIC {
        return Err(Error::BadMagic {
            context: "utoc header",
        });
    }

    let version = TocVersion::try_from(c.read_u8()?)?;
    let _reserved0 = c.read_u8()?;
    let _reserved1 = c.read_u16()?;

    let header_size = c.read_u32()?;
    if header_size as usize != HEADER_SIZE {
        return Err(Error::InvalidRecord(format!(
            "declared TOC header size {header_size} (expected {HEADER_SIZE})"
        )));
    }

    let entry_count = c.read_u32()?;
    let compressed_block_entry_count = c.read_u32()?;
    let compressed_block_entry_size = c.read_u32()?;
    let compression_method_name_count = c.read_u32()?;
    let compression_method_name_length = c.read_u32()?;
    if compression_method_name_length > 32 {
        return Err(Error::InvalidRecord(format!(
            "compression method name length {compression_method_name_length} exceeds 32"
        )));
    }
    let compression_block_size = c.read_u32()?;
    let directory_index_size = c.read_u32()?;
    let partition_count = c.read_u32()?;
    let container_id = c.read_u64()?;
    let encryption_key_guid = c.read_array::<16>()?;
    let container_flags = ContainerFlags::from_bits(c.read_u8()?);
    let _reserved3 = c.read_u8()?;
    let _reserved4 = c.read_u16()?;
    let perfect_hash_seeds_count = c.read_u32()?;
    let partition_size = c.read_u64()?;
    let chunks_without_perfect_hash_count = c.read_u32()?;
    let _reserved7 = c.read_u32()?;
    c.skip(8 * 5)?;

    Ok(TocHeader {
        version,
        header_size,
        entry_count,
        compressed_block_entry_count,
        compressed_block_entry_size,
        compression_method_name_count,
        compression_method_name_length,
        compression_block_size,
        directory_index_size,
        partition_count,
        container_id,
        encryption_key_guid,
        container_flags,
        perfect_hash_seeds_count,
        partition_size,
        chunks_without_perfect_hash_count,
    })
}
