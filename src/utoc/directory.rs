//! Directory index parsing and traversal.
//!
//! The directory index encodes a tree as indices into flat vectors: each
//! directory names its first child, next sibling and first file; files form
//! singly-linked lists. Names live in a shared string table. The decoder
//! keeps this flat representation and derives full paths by traversal.

use log::trace;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// One directory node. All indices use the `0xFFFFFFFF` = absent sentinel
/// on the wire, normalized to `Option` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// String-table index of the directory name; the root has none.
    pub name: Option<u32>,
    pub first_child_entry: Option<u32>,
    pub next_sibling_entry: Option<u32>,
    pub first_file_entry: Option<u32>,
}

/// One file node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    /// String-table index of the file name.
    pub name: u32,
    pub next_file_entry: Option<u32>,
    /// The chunk index this file refers to.
    pub user_data: u32,
}

/// Decoded directory index. Entry 0 of `directory_entries` is the root.
#[derive(Debug, Clone, Default)]
pub struct DirectoryIndex {
    pub mount_point: String,
    pub directory_entries: Vec<DirectoryEntry>,
    pub file_entries: Vec<FileEntry>,
    pub string_table: Vec<String>,
}

impl DirectoryIndex {
    /// Depth-first walk from the root yielding `(full path, chunk index)`
    /// for every file, directories in tree order and files in list order.
    /// Paths are `mount_point` + segments joined with `/`, repeated
    /// separators collapsed.
    ///
    /// Fails on an out-of-range index or a directory/file cycle; parsing
    /// runs this walk once, so on a decoded index it cannot fail.
    pub fn collect_files(&self) -> Result<Vec<(String, u32)>> {
        let mut out = Vec::new();
        if self.directory_entries.is_empty() {
            return Ok(out);
        }

        let mut visited = vec![false; self.directory_entries.len()];
        // Stack of (directory index, path up to and including that
        // directory's parent); children are pushed in reverse so that
        // popping preserves sibling order.
        let mut stack: Vec<(u32, String)> = vec![(0, self.mount_point.clone())];

        while let Some((dir_index, prefix)) = stack.pop() {
            let dir = self.directory(dir_index)?;
            if std::mem::replace(&mut visited[dir_index as usize], true) {
                return Err(Error::InvalidRecord(format!(
                    "directory {dir_index} reachable twice in directory index"
                )));
            }

            let mut path = prefix;
            if let Some(name_index) = dir.name {
                push_segment(&mut path, self.string(name_index)?);
            }

            let mut file_index = dir.first_file_entry;
            let mut walked = 0usize;
            while let Some(current) = file_index {
                let file = self.file(current)?;
                walked += 1;
                if walked > self.file_entries.len() {
                    return Err(Error::InvalidRecord(format!(
                        "file list starting at {current} cycles"
                    )));
                }
                let mut full = path.clone();
                push_segment(&mut full, self.string(file.name)?);
                out.push((full, file.user_data));
                file_index = file.next_file_entry;
            }

            let mut children = Vec::new();
            let mut child_index = dir.first_child_entry;
            while let Some(current) = child_index {
                children.push(current);
                if children.len() > self.directory_entries.len() {
                    return Err(Error::InvalidRecord(format!(
                        "sibling chain starting at {current} cycles"
                    )));
                }
                child_index = self.directory(current)?.next_sibling_entry;
            }
            for &child in children.iter().rev() {
                stack.push((child, path.clone()));
            }
        }

        Ok(out)
    }

    /// Full file paths in tree order.
    pub fn all_file_paths(&self) -> Result<Vec<String>> {
        Ok(self
            .collect_files()?
            .into_iter()
            .map(|(path, _)| path)
            .collect())
    }

    fn directory(&self, index: u32) -> Result<&DirectoryEntry> {
        self.directory_entries.get(index as usize).ok_or_else(|| {
            Error::InvalidRecord(format!(
                "directory index {index} out of range ({} entries)",
                self.directory_entries.len()
            ))
        })
    }

    fn file(&self, index: u32) -> Result<&FileEntry> {
        self.file_entries.get(index as usize).ok_or_else(|| {
            Error::InvalidRecord(format!(
                "file index {index} out of range ({} entries)",
                self.file_entries.len()
            ))
        })
    }

    fn string(&self, index: u32) -> Result<&str> {
        self.string_table
            .get(index as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::InvalidRecord(format!(
                    "string index {index} out of range ({} strings)",
                    self.string_table.len()
                ))
            })
    }
}

fn push_segment(path: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    if !path.is_empty() && !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(segment);
}

/// Parse the directory-index sub-buffer and validate its tree structure.
pub(super) fn read(buf: &[u8]) -> Result<DirectoryIndex> {
    let mut c = Cursor::new(buf);

    let mount_point = c.read_string()?;

    let directory_count = c.read_u32()? as usize;
    if directory_count.saturating_mul(16) > c.remaining() {
        return Err(Error::Truncated {
            needed: directory_count * 16,
            remaining: c.remaining(),
        });
    }
    let mut directory_entries = Vec::with_capacity(directory_count);
    for _ in 0..directory_count {
        directory_entries.push(DirectoryEntry {
            name: c.read_optional_index()?,
            first_child_entry: c.read_optional_index()?,
            next_sibling_entry: c.read_optional_index()?,
            first_file_entry: c.read_optional_index()?,
        });
    }

    let file_count = c.read_u32()? as usize;
    if file_count.saturating_mul(12) > c.remaining() {
        return Err(Error::Truncated {
            needed: file_count * 12,
            remaining: c.remaining(),
        });
    }
    let mut file_entries = Vec::with_capacity(file_count);
    for _ in 0..file_count {
        file_entries.push(FileEntry {
            name: c.read_u32()?,
            next_file_entry: c.read_optional_index()?,
            user_data: c.read_u32()?,
        });
    }

    let string_count = c.read_u32()? as usize;
    let mut string_table = Vec::with_capacity(string_count.min(c.remaining() / 4));
    for _ in 0..string_count {
        string_table.push(c.read_string()?);
    }

    trace!(
        "directory index: mount point {mount_point:?}, {directory_count} directories, \
         {file_count} files, {string_count} strings"
    );

    let index = DirectoryIndex {
        mount_point,
        directory_entries,
        file_entries,
        string_table,
    };
    // Walk once now so nothing can fail after open.
    index.collect_files()?;
    Ok(index)
}
