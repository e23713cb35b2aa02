//! Read-only PAK archive reader.
//!
//! Legacy PAK files keep their metadata at the end: a version-dependent
//! footer locating an index of `(path, entry)` records. The on-disk version
//! is not self-describing, so [`PakReader`] probes candidate revisions
//! newest-first and accepts the first whose footer and index both decode.

mod entry;
mod footer;
mod index;
mod version;

pub use entry::{Block, Entry};
pub use footer::{Compression, Footer, MAGIC};
pub use index::INVALID_ENCODED_OFFSET;
pub use version::{Version, VersionMajor};

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{info, trace};

use crate::error::{Error, Result};

/// Reader over the decoded index of a PAK archive.
///
/// The whole model is built during [`open`](PakReader::open); afterwards the
/// reader owns only in-memory data and every query is a pure read. A reader
/// is single-threaded; use one instance per file.
#[derive(Debug)]
pub struct PakReader {
    footer: Footer,
    mount_point: String,
    entries: Vec<(String, Entry)>,
    by_path: HashMap<String, usize>,
    directories: OnceCell<Vec<String>>,
}

impl PakReader {
    /// Open a PAK archive from disk.
    ///
    /// The file handle is released before returning; the reader keeps only
    /// the decoded model.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("opening PAK archive: {}", path.display());
        let mut file = BufReader::new(File::open(path)?);
        Self::from_reader(&mut file)
    }

    /// Decode a PAK archive from any seekable byte source.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        let (footer, index) = probe(reader, file_size)?;
        info!(
            "PAK archive decoded: {}, {} entries",
            footer.version,
            index.entries.len()
        );
        Ok(Self {
            footer,
            mount_point: index.mount_point,
            entries: index.entries,
            by_path: index.by_path,
            directories: OnceCell::new(),
        })
    }

    /// The format revision the probe accepted.
    pub fn version(&self) -> Version {
        self.footer.version
    }

    /// Logical path prefix applied to all entries.
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Whether the footer declares an encrypted index.
    ///
    /// Always `false` on a successfully opened reader: an encrypted index
    /// fails [`open`](PakReader::open) with
    /// [`Error::EncryptedContainer`](crate::Error::EncryptedContainer).
    pub fn encrypted_index(&self) -> bool {
        self.footer.encrypted
    }

    /// The encryption key GUID, on revisions that carry one.
    pub fn encryption_guid(&self) -> Option<u128> {
        self.footer.encryption_guid
    }

    /// The decoded footer.
    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// All file paths, in index order, without mount-point concatenation.
    pub fn files(&self) -> Vec<&str> {
        self.entries.iter().map(|(path, _)| path.as_str()).collect()
    }

    /// All `(path, entry)` pairs, in index order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.as_str(), entry))
    }

    /// Look up one file's physical descriptor by its stored path.
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.by_path.get(path).map(|&slot| &self.entries[slot].1)
    }

    /// Every proper ancestor of every file path, unique and sorted.
    pub fn directories(&self) -> &[String] {
        self.directories.get_or_init(|| {
            let mut dirs = BTreeSet::new();
            for (path, _) in &self.entries {
                let mut prefix = path.as_str();
                while let Some(pos) = prefix.rfind('/') {
                    prefix = &prefix[..pos];
                    if prefix.is_empty() {
                        break;
                    }
                    dirs.insert(prefix.to_string());
                }
            }
            dirs.into_iter().collect()
        })
    }
}

/// Errors that mean "this candidate version does not fit", as opposed to
/// failures that no other version could recover from.
fn wrong_version_shape(error: &Error) -> bool {
    matches!(
        error,
        Error::BadMagic { .. }
            | Error::UnsupportedVersion(_)
            | Error::Truncated { .. }
            | Error::InvalidRecord(_)
    )
}

/// Try candidate versions newest-first; accept the first whose footer and
/// index both decode. When every candidate fails, surface the failure from
/// the attempt that got furthest (index-stage over footer-stage, newest
/// version on a tie) instead of whichever error happened last.
fn probe<R: Read + Seek>(reader: &mut R, file_size: u64) -> Result<(Footer, index::Index)> {
    let mut best: Option<(u8, Error)> = None;
    fn keep_best(stage: u8, error: Error, best: &mut Option<(u8, Error)>) {
        if best.as_ref().map_or(true, |(rank, _)| stage > *rank) {
            *best = Some((stage, error));
        }
    }

    for candidate in Version::PROBE_ORDER {
        trace!("probing PAK as {candidate}");
        let footer = match footer::read(reader, file_size, candidate) {
            Ok(footer) => footer,
            Err(error) if wrong_version_shape(&error) => {
                keep_best(0, error, &mut best);
                continue;
            }
            Err(error) => return Err(error),
        };
        match index::read(reader, file_size, &footer) {
            Ok(index) => return Ok((footer, index)),
            Err(error) if wrong_version_shape(&error) => {
                keep_best(1, error, &mut best);
                continue;
            }
            Err(error) => return Err(error),
        }
    }

    Err(best.map(|(_, error)| error).unwrap_or_else(|| {
        Error::InvalidRecord("not a recognized PAK file".to_string())
    }))
}
