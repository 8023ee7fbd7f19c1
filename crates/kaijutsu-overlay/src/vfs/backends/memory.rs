//! In-memory filesystem backend.
//!
//! Used for tests and for small synthetic trees. Contents are fixed once the
//! backend is built; the overlay never writes to it.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::vfs::ops::{FileHandle, OpenFs, ReadDirFs, StatFs, VfsFile};
use crate::vfs::path;
use crate::vfs::types::{DirEntry, FileAttr, FileType};

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Arc<[u8]>, attr: FileAttr },
    Directory { attr: FileAttr },
}

impl Entry {
    fn attr(&self) -> &FileAttr {
        match self {
            Entry::File { attr, .. } => attr,
            Entry::Directory { attr } => attr,
        }
    }
}

/// In-memory filesystem backend.
///
/// Built with [`with_file`](Self::with_file) and [`with_dir`](Self::with_dir);
/// parent directories are created implicitly.
///
/// ```
/// use kaijutsu_overlay::MemoryBackend;
///
/// let fs = MemoryBackend::new()
///     .with_file("docs/readme.md", b"hello")
///     .with_dir("empty");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    /// Keyed by clean relative path; the root is `"."`.
    entries: BTreeMap<String, Entry>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            ".".to_string(),
            Entry::Directory {
                attr: FileAttr::directory(0o755),
            },
        );
        Self { entries }
    }

    /// Add a file, replacing any existing file at that path.
    pub fn with_file(mut self, path: &str, data: impl AsRef<[u8]>) -> Self {
        self.insert_file(path, data);
        self
    }

    /// Add a directory.
    pub fn with_dir(mut self, path: &str) -> Self {
        self.insert_dir(path);
        self
    }

    /// Add a file in place.
    pub fn insert_file(&mut self, path: &str, data: impl AsRef<[u8]>) {
        let key = Self::normalize(path);
        self.ensure_parents(&key);
        let data: Arc<[u8]> = Arc::from(data.as_ref());
        let attr = FileAttr::file(data.len() as u64, 0o644);
        self.entries.insert(key, Entry::File { data, attr });
    }

    /// Add a directory in place.
    pub fn insert_dir(&mut self, path: &str) {
        let key = Self::normalize(path);
        self.ensure_parents(&key);
        self.entries.entry(key).or_insert(Entry::Directory {
            attr: FileAttr::directory(0o755),
        });
    }

    /// Normalize a path: remove leading `/`, resolve `.` and `..`.
    ///
    /// `..` never climbs above the root.
    fn normalize(path: &str) -> String {
        let rooted = path::clean(&format!("/{}", path));
        match rooted.strip_prefix('/') {
            Some("") | None => ".".to_string(),
            Some(rest) => rest.to_string(),
        }
    }

    /// Ensure all parent directories exist.
    fn ensure_parents(&mut self, key: &str) {
        let mut current = String::new();
        let Some((parents, _)) = key.rsplit_once('/') else {
            return;
        };
        for segment in parents.split('/') {
            let parent = if current.is_empty() { "." } else { current.as_str() };
            current = path::join(parent, segment);
            self.entries
                .entry(current.clone())
                .or_insert(Entry::Directory {
                    attr: FileAttr::directory(0o755),
                });
        }
    }

    fn lookup(&self, path: &str) -> io::Result<(&str, &Entry)> {
        let key = Self::normalize(path);
        self.entries
            .get_key_value(&key)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("not found: {}", key)))
    }

    /// Direct children of a directory key.
    fn children(&self, dir: &str) -> Vec<DirEntry> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| {
                if key == "." {
                    return None;
                }
                let (parent, name) = key.rsplit_once('/').unwrap_or((".", key.as_str()));
                (parent == dir).then(|| {
                    let kind = match entry {
                        Entry::File { .. } => FileType::File,
                        Entry::Directory { .. } => FileType::Directory,
                    };
                    DirEntry::new(name, kind)
                })
            })
            .collect()
    }
}

impl OpenFs for MemoryBackend {
    fn open(&self, path: &str) -> io::Result<FileHandle> {
        let (key, entry) = self.lookup(path)?;
        let file = match entry {
            Entry::File { data, attr } => MemoryFile {
                attr: attr.clone(),
                content: Content::File(Cursor::new(Arc::clone(data))),
            },
            Entry::Directory { attr } => MemoryFile {
                attr: attr.clone(),
                content: Content::Directory(self.children(key)),
            },
        };
        Ok(Box::new(file))
    }
}

impl ReadDirFs for MemoryBackend {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let (key, entry) = self.lookup(path)?;
        match entry {
            Entry::Directory { .. } => Ok(self.children(key)),
            Entry::File { .. } => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", key),
            )),
        }
    }
}

impl StatFs for MemoryBackend {
    fn stat(&self, path: &str) -> io::Result<FileAttr> {
        let (_, entry) = self.lookup(path)?;
        Ok(entry.attr().clone())
    }
}

enum Content {
    File(Cursor<Arc<[u8]>>),
    Directory(Vec<DirEntry>),
}

/// Open handle into a [`MemoryBackend`].
///
/// Holds its own snapshot of the data, so it stays valid after the backend
/// is unmounted or dropped.
pub struct MemoryFile {
    attr: FileAttr,
    content: Content,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.content {
            Content::File(cursor) => cursor.read(buf),
            Content::Directory(_) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "is a directory",
            )),
        }
    }
}

impl VfsFile for MemoryFile {
    fn stat(&self) -> io::Result<FileAttr> {
        Ok(self.attr.clone())
    }

    fn read_dir(&mut self) -> io::Result<Vec<DirEntry>> {
        match &self.content {
            Content::Directory(entries) => Ok(entries.clone()),
            Content::File(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "not a directory",
            )),
        }
    }
}
