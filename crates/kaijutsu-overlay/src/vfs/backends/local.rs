//! Local filesystem backend.
//!
//! Provides read access to a host directory, with path security to prevent
//! escaping the root directory.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use crate::vfs::ops::{FileHandle, OpenFs, ReadDirFs, StatFs, VfsFile};
use crate::vfs::types::{DirEntry, FileAttr, FileType};

/// Local filesystem backend.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/home/amy/project`, then `open("src/main.rs")` opens
/// `/home/amy/project/src/main.rs`.
///
/// Path security is enforced: `..` components are rejected, and paths whose
/// canonical form leaves the root (through a symlink) are refused.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a local filesystem rooted at the given directory.
    ///
    /// The root is canonicalized at construction time to handle symlinks
    /// (e.g. macOS `/tmp` → `/private/tmp`), so it must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = dunce::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", root.display()),
            ));
        }
        Ok(Self { root })
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to a host path within the root.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let path = path.trim_start_matches('/');
        let mut full = self.root.clone();

        for component in Path::new(path).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(segment) => full.push(segment),
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(escape_error(path));
                }
            }
        }

        // Symlinks inside the root may still point outside it.
        if full.exists() {
            let canonical = dunce::canonicalize(&full)?;
            if !canonical.starts_with(&self.root) {
                return Err(escape_error(path));
            }
            return Ok(canonical);
        }
        Ok(full)
    }

    /// Convert followed std::fs::Metadata to FileAttr.
    ///
    /// Links are resolved before this point, so only files and directories
    /// come out. Listings still report links as `Symlink`.
    fn metadata_to_attr(meta: &fs::Metadata) -> FileAttr {
        let kind = if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        };

        FileAttr {
            size: if meta.is_dir() { 0 } else { meta.len() },
            kind,
            perm: permissions(meta),
            mtime: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    fn list_host_dir(dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let kind = if file_type.is_dir() {
                FileType::Directory
            } else if file_type.is_symlink() {
                FileType::Symlink
            } else {
                FileType::File
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

fn escape_error(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("path escapes root: {}", path),
    )
}

#[cfg(unix)]
fn permissions(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permissions(meta: &fs::Metadata) -> u32 {
    match (meta.is_dir(), meta.permissions().readonly()) {
        (true, _) => 0o555,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

impl OpenFs for LocalBackend {
    fn open(&self, path: &str) -> io::Result<FileHandle> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path)?;
        let attr = Self::metadata_to_attr(&meta);

        let handle = if meta.is_dir() {
            Handle::Directory(full_path)
        } else {
            Handle::File(fs::File::open(&full_path)?)
        };
        Ok(Box::new(LocalFile { attr, handle }))
    }
}

impl ReadDirFs for LocalBackend {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;
        Self::list_host_dir(&full_path)
    }
}

impl StatFs for LocalBackend {
    fn stat(&self, path: &str) -> io::Result<FileAttr> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path)?;
        Ok(Self::metadata_to_attr(&meta))
    }
}

enum Handle {
    File(fs::File),
    Directory(PathBuf),
}

/// Open handle into a [`LocalBackend`].
pub struct LocalFile {
    attr: FileAttr,
    handle: Handle,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.handle {
            Handle::File(file) => file.read(buf),
            Handle::Directory(_) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "is a directory",
            )),
        }
    }
}

impl VfsFile for LocalFile {
    fn stat(&self) -> io::Result<FileAttr> {
        Ok(self.attr.clone())
    }

    fn read_dir(&mut self) -> io::Result<Vec<DirEntry>> {
        match &self.handle {
            Handle::Directory(dir) => LocalBackend::list_host_dir(dir),
            Handle::File(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "not a directory",
            )),
        }
    }
}
