//! PAK index parsing.
//!
//! The index region starts at the footer's declared offset and holds the
//! mount point plus per-file records. Two shapes exist: a flat list of
//! `(path, entry)` pairs (V1–V9), and the V10+ split into a path-hash index
//! and a full directory index, both referenced by offset from the primary
//! index block.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace};

use super::entry::{self, Entry};
use super::footer::Footer;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Sentinel marking an invalid file slot in the full directory index.
pub const INVALID_ENCODED_OFFSET: u32 = 0x8000_0000;

/// Decoded index: the mount point and the ordered entry map.
pub(super) struct Index {
    pub mount_point: String,
    pub entries: Vec<(String, Entry)>,
    pub by_path: HashMap<String, usize>,
}

impl Index {
    fn empty() -> Self {
        Index {
            mount_point: String::new(),
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Insertion-ordered, last writer wins on a duplicate path.
    fn insert(&mut self, path: String, entry: Entry) {
        match self.by_path.get(&path) {
            Some(&slot) => self.entries[slot].1 = entry,
            None => {
                self.by_path.insert(path.clone(), self.entries.len());
                self.entries.push((path, entry));
            }
        }
    }
}

pub(super) fn read<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
    footer: &Footer,
) -> Result<Index> {
    if footer.encrypted {
        return Err(Error::EncryptedContainer {
            encryption_guid: footer.encryption_guid,
        });
    }
    if footer.index_size == 0 {
        return Ok(Index::empty());
    }

    let buf = read_region(reader, file_size, footer.index_offset, footer.index_size)?;
    let mut c = Cursor::new(&buf);

    let mut index = Index::empty();
    index.mount_point = c.read_string()?;
    let entry_count = c.read_u32()?;
    trace!(
        "pak index: mount point {:?}, {entry_count} declared entries",
        index.mount_point
    );

    if footer.version.has_path_hash_index() {
        read_split_index(reader, file_size, &mut c, &mut index)?;
    } else {
        for _ in 0..entry_count {
            let path = c.read_string()?;
            let entry = entry::read(&mut c, footer)?;
            index.insert(path, entry);
        }
    }

    debug!("pak index decoded: {} entries", index.entries.len());
    Ok(index)
}

/// V10+ shape: a path-hash seed, then two optional referenced blocks. Only
/// the full directory index is walked; the path-hash index body is not
/// needed for a listing. Entry records live in an encoded pool the crate
/// treats as opaque, so listed files carry placeholder descriptors.
fn read_split_index<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
    c: &mut Cursor<'_>,
    index: &mut Index,
) -> Result<()> {
    let _path_hash_seed = c.read_u64()?;

    let has_path_hash_index = c.read_u32()?;
    if has_path_hash_index != 0 {
        let _offset = c.read_u64()?;
        let _size = c.read_u64()?;
        let _hash = c.read_array::<20>()?;
    }

    let has_full_directory_index = c.read_u32()?;
    if has_full_directory_index == 0 {
        return Ok(());
    }
    let dir_offset = c.read_u64()?;
    let dir_size = c.read_u64()?;
    let _hash = c.read_array::<20>()?;

    let buf = read_region(reader, file_size, dir_offset, dir_size)?;
    let mut dc = Cursor::new(&buf);

    let dir_count = dc.read_u32()?;
    for _ in 0..dir_count {
        let dir_name = dc.read_string()?;
        let file_count = dc.read_u32()?;
        for _ in 0..file_count {
            let file_name = dc.read_string()?;
            let encoded_offset = dc.read_u32()?;
            if encoded_offset == INVALID_ENCODED_OFFSET {
                continue;
            }
            let joined = format!("{}/{}", dir_name.trim_end_matches('/'), file_name);
            let path = joined.strip_prefix('/').unwrap_or(&joined).to_string();
            index.insert(path, Entry::placeholder());
        }
    }
    Ok(())
}

/// Read `size` bytes at `offset`, bounds-checked against the file size.
fn read_region<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
    offset: u64,
    size: u64,
) -> Result<Vec<u8>> {
    let end = offset.checked_add(size).ok_or_else(|| {
        Error::InvalidRecord(format!("index region {offset}+{size} overflows"))
    })?;
    if end > file_size {
        return Err(Error::Truncated {
            needed: size as usize,
            remaining: file_size.saturating_sub(offset) as usize,
        });
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; size as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
