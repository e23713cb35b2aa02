//! PAK format versions and the footer/record fields each one carries.

use std::fmt;

use crate::error::{Error, Result};

/// Concrete PAK format revision, including the two V8 sub-revisions that
/// share a major version but differ in footer layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8A,
    V8B,
    V9,
    V10,
    V11,
}

/// Major version number as written to the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionMajor {
    /// v0 unknown
    Unknown,
    /// v1 initial specification
    Initial,
    /// v2 timestamps removed
    NoTimestamps,
    /// v3 compression and encryption support
    CompressionEncryption,
    /// v4 index encryption support
    IndexEncryption,
    /// v5 offsets are relative to header
    RelativeChunkOffsets,
    /// v6 record deletion support
    DeleteRecords,
    /// v7 include key GUID
    EncryptionKeyGuid,
    /// v8 compression names included
    FnameBasedCompression,
    /// v9 frozen index byte included
    FrozenIndex,
    /// v10 path-hash/full-directory index split
    PathHashIndex,
    /// v11 fixed FNV-64 path hashing
    Fnv64BugFix,
}

impl Version {
    /// Candidate versions for the trial probe, newest first. V0 is not a
    /// decodable on-disk revision and is excluded.
    pub const PROBE_ORDER: [Version; 12] = [
        Version::V11,
        Version::V10,
        Version::V9,
        Version::V8B,
        Version::V8A,
        Version::V7,
        Version::V6,
        Version::V5,
        Version::V4,
        Version::V3,
        Version::V2,
        Version::V1,
    ];

    /// The major version this revision writes to the footer.
    pub fn major(self) -> VersionMajor {
        match self {
            Version::V0 => VersionMajor::Unknown,
            Version::V1 => VersionMajor::Initial,
            Version::V2 => VersionMajor::NoTimestamps,
            Version::V3 => VersionMajor::CompressionEncryption,
            Version::V4 => VersionMajor::IndexEncryption,
            Version::V5 => VersionMajor::RelativeChunkOffsets,
            Version::V6 => VersionMajor::DeleteRecords,
            Version::V7 => VersionMajor::EncryptionKeyGuid,
            Version::V8A | Version::V8B => VersionMajor::FnameBasedCompression,
            Version::V9 => VersionMajor::FrozenIndex,
            Version::V10 => VersionMajor::PathHashIndex,
            Version::V11 => VersionMajor::Fnv64BugFix,
        }
    }

    /// Footer carries a 128-bit encryption key GUID.
    pub fn has_encryption_guid(self) -> bool {
        self.major() >= VersionMajor::EncryptionKeyGuid
    }

    /// Footer carries the encrypted-index flag byte.
    pub fn has_encrypted_flag(self) -> bool {
        self.major() >= VersionMajor::IndexEncryption
    }

    /// Footer carries the frozen-index flag byte (V9 only).
    pub fn has_frozen_flag(self) -> bool {
        self.major() == VersionMajor::FrozenIndex
    }

    /// Footer declares its own compression-method name table.
    pub fn has_compression_table(self) -> bool {
        self.major() >= VersionMajor::FnameBasedCompression
    }

    /// Number of 32-byte compression-method names in the footer.
    pub fn compression_name_count(self) -> usize {
        if self < Version::V8A {
            0
        } else if self < Version::V8B {
            4
        } else {
            5
        }
    }

    /// Entry records carry a 64-bit timestamp (V1 only).
    pub fn has_timestamps(self) -> bool {
        self.major() == VersionMajor::Initial
    }

    /// Entry records carry compression blocks, flags and block size.
    pub fn has_compression_blocks(self) -> bool {
        self.major() >= VersionMajor::CompressionEncryption
    }

    /// Index is split into a path-hash index and a full directory index.
    pub fn has_path_hash_index(self) -> bool {
        self.major() >= VersionMajor::PathHashIndex
    }

    /// Size in bytes of the footer this revision writes.
    pub fn footer_size(self) -> u64 {
        // magic + version: u32 each, index offset + size: u64 each, hash: 20
        let mut size: u64 = 4 + 4 + 8 + 8 + 20;
        if self.has_encryption_guid() {
            size += 16;
        }
        if self.has_encrypted_flag() {
            size += 1;
        }
        if self.has_frozen_flag() {
            size += 1;
        }
        size += 32 * self.compression_name_count() as u64;
        size
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::V0 => "v0",
            Version::V1 => "v1",
            Version::V2 => "v2",
            Version::V3 => "v3",
            Version::V4 => "v4",
            Version::V5 => "v5",
            Version::V6 => "v6",
            Version::V7 => "v7",
            Version::V8A => "v8a",
            Version::V8B => "v8b",
            Version::V9 => "v9",
            Version::V10 => "v10",
            Version::V11 => "v11",
        };
        f.write_str(name)
    }
}

impl From<VersionMajor> for u32 {
    fn from(value: VersionMajor) -> Self {
        value as u32
    }
}

impl VersionMajor {
    fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => VersionMajor::Unknown,
            1 => VersionMajor::Initial,
            2 => VersionMajor::NoTimestamps,
            3 => VersionMajor::CompressionEncryption,
            4 => VersionMajor::IndexEncryption,
            5 => VersionMajor::RelativeChunkOffsets,
            6 => VersionMajor::DeleteRecords,
            7 => VersionMajor::EncryptionKeyGuid,
            8 => VersionMajor::FnameBasedCompression,
            9 => VersionMajor::FrozenIndex,
            10 => VersionMajor::PathHashIndex,
            11 => VersionMajor::Fnv64BugFix,
            _ => return None,
        })
    }
}

impl TryFrom<u32> for VersionMajor {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        VersionMajor::from_u32(value).ok_or(Error::UnsupportedVersion(value))
    }
}
