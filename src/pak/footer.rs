//! PAK footer parsing.
//!
//! The footer sits at the very end of the file and its size depends on the
//! revision being probed. Fields in read order:
//! - encryption key GUID: u128 (V7+)
//! - encrypted-index flag: bool byte (V4+)
//! - magic: u32, `0x5A6F12E1`
//! - version major: u32, must agree with the probed revision
//! - index offset, index size: u64 each
//! - index hash: 20 bytes
//! - frozen-index flag: bool byte (V9 only)
//! - compression-method names: 0, 4 or 5 NUL-padded 32-byte ASCII slots

use std::io::{Read, Seek, SeekFrom};

use log::debug;

use super::version::{Version, VersionMajor};
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Magic number that identifies a PAK footer.
pub const MAGIC: u32 = 0x5A6F12E1;

/// Compression methods a footer slot can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Zlib,
    Gzip,
    Oodle,
    Zstd,
    Lz4,
}

impl Compression {
    /// Exact case-sensitive match against the on-disk name; anything else
    /// (including an empty slot) has no value.
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Zlib" => Some(Compression::Zlib),
            b"Gzip" => Some(Compression::Gzip),
            b"Oodle" => Some(Compression::Oodle),
            b"Zstd" => Some(Compression::Zstd),
            b"LZ4" => Some(Compression::Lz4),
            _ => None,
        }
    }
}

/// Decoded trailing metadata block of a PAK file.
#[derive(Debug, Clone)]
pub struct Footer {
    pub encryption_guid: Option<u128>,
    pub encrypted: bool,
    pub magic: u32,
    pub version: Version,
    pub index_offset: u64,
    pub index_size: u64,
    pub index_hash: [u8; 20],
    pub frozen: bool,
    /// Method table referenced by entry compression slots. Slots an entry
    /// can name but the footer left empty or unrecognized are `None`.
    pub compression: Vec<Option<Compression>>,
}

/// Decode the footer under the assumption that the file is `version`.
pub(super) fn read<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
    version: Version,
) -> Result<Footer> {
    let footer_size = version.footer_size();
    if file_size < footer_size {
        return Err(Error::Truncated {
            needed: footer_size as usize,
            remaining: file_size as usize,
        });
    }

    reader.seek(SeekFrom::Start(file_size - footer_size))?;
    let mut buf = vec![0u8; footer_size as usize];
    reader.read_exact(&mut buf)?;
    let mut c = Cursor::new(&buf);

    let encryption_guid = if version.has_encryption_guid() {
        Some(c.read_u128()?)
    } else {
        None
    };
    let encrypted = if version.has_encrypted_flag() {
        c.read_bool()?
    } else {
        false
    };

    let magic = c.read_u32()?;
    if magic != MAGIC {
        return Err(Error::BadMagic {
            context: "pak footer",
        });
    }

    let declared = c.read_u32()?;
    if VersionMajor::try_from(declared)? != version.major() {
        return Err(Error::UnsupportedVersion(declared));
    }

    let index_offset = c.read_u64()?;
    let index_size = c.read_u64()?;
    let index_hash = c.read_array::<20>()?;
    let frozen = if version.has_frozen_flag() {
        c.read_bool()?
    } else {
        false
    };

    let mut compression = Vec::with_capacity(version.compression_name_count());
    for _ in 0..version.compression_name_count() {
        let slot = c.read_array::<32>()?;
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        compression.push(Compression::from_name(&slot[..end]));
    }
    // Older revisions declare no table; entries still reference slots by
    // index, so the implicit method set is synthesized.
    if !version.has_compression_table() {
        compression.extend([
            Some(Compression::Zlib),
            Some(Compression::Gzip),
            Some(Compression::Oodle),
        ]);
    }

    debug!(
        "pak footer decoded as {version}: index at {index_offset}+{index_size}, \
         {} compression slots",
        compression.len()
    );

    Ok(Footer {
        encryption_guid,
        encrypted,
        magic,
        version,
        index_offset,
        index_size,
        index_hash,
        frozen,
        compression,
    })
}
