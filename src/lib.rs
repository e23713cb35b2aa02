//! Read-only parsers for the two Unreal Engine content-container formats:
//! legacy PAK archives and IoStore table-of-contents (UTOC) files.
//!
//! Both decoders share one pipeline shape:
//!
//! ```text
//! raw bytes ─► version probe ─► fixed region ─► variable region ─► model
//! ```
//!
//! - [`pak::PakReader`] probes the footer newest-version-first (the PAK
//!   format is not self-describing), then decodes the index into an ordered
//!   map of paths to physical descriptors.
//! - [`utoc::UtocReader`] reads the declared version from the 144-byte
//!   header, then decodes the section sequence including the directory
//!   index.
//!
//! The crate surfaces container *metadata* only: per-file offsets, sizes,
//! hashes and compression descriptors. Extracting, decompressing or
//! decrypting chunk contents is out of scope, and an encrypted index or
//! container fails [`pak::PakReader::open`]/[`utoc::UtocReader::open`] with
//! [`Error::EncryptedContainer`] carrying the key GUID when one was
//! declared.

pub mod cursor;
pub mod error;
pub mod pak;
pub mod utoc;

pub use error::{Error, Result};
pub use pak::PakReader;
pub use utoc::UtocReader;
