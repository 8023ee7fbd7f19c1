//! The overlay facade.
//!
//! [`OverlayFs`] composes independently opened backends into one read-only
//! namespace. Every operation runs under a single reader/writer lock:
//! `mount`/`unmount` take it exclusively, lookups take it shared and keep it
//! for the whole backend call. A slow backend therefore delays pending
//! mounts, but never other readers.

use std::fmt;
use std::io::{self, Read};

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::error::{VfsError, VfsResult};
use super::mount::{MountInfo, MountTable};
use super::ops::{Backend, FileHandle, OpenFs, ReadDirFs, StatFs};
use super::path;
use super::synth::{self, PathClass};
use super::types::{DirEntry, FileAttr};

/// Read-only union of mounted backends.
///
/// ```text
/// /                    # synthesized
/// ├── quux/            # backend A
/// └── mnt/             # synthesized
///     ├── project/     # backend B
///     └── reference/   # backend C
/// ```
///
/// Paths are slash-separated and lexically normalized before matching.
/// Relative paths are taken as rooted, so `"."` is the overlay root.
#[derive(Default)]
pub struct OverlayFs {
    table: RwLock<MountTable>,
}

impl fmt::Debug for OverlayFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayFs")
            .field("mounts", &self.table.try_read().map(|t| t.len()))
            .finish()
    }
}

impl OverlayFs {
    /// Create an overlay with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `backend` under `prefix`.
    ///
    /// `/foo/` and `/foo` name the same mount point. Fails with
    /// `InvalidPrefix` if the prefix is not absolute once normalized, and
    /// with `AlreadyMounted` if it is already bound.
    pub fn mount(&self, prefix: &str, backend: Backend) -> VfsResult<()> {
        let mut table = self.table.write();
        table.insert(prefix, backend)?;
        Ok(())
    }

    /// Remove the binding at `prefix`.
    ///
    /// The backend is dropped from the table but otherwise left alone.
    pub fn unmount(&self, prefix: &str) -> VfsResult<()> {
        let mut table = self.table.write();
        table.remove(prefix)?;
        Ok(())
    }

    /// Returns true if a backend is bound at exactly `prefix`.
    pub fn is_mounted(&self, prefix: &str) -> bool {
        match MountTable::normalize_prefix(prefix) {
            Ok(prefix) => self.table.read().contains(&prefix),
            Err(_) => false,
        }
    }

    /// List all current mounts, longest prefix first.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.table.read().list()
    }

    /// Open the file at `path` in the backend that owns it.
    ///
    /// The handle comes straight from the backend. Paths that map to no
    /// mount fail with `NotFound`, including pseudo-directories.
    pub fn open(&self, path: &str) -> VfsResult<FileHandle> {
        let path = path::to_absolute(path);
        let table = self.table.read();
        let resolved = table
            .resolve(&path)
            .ok_or_else(|| VfsError::not_found(path.as_str()))?;
        Ok(resolved.backend.open(&resolved.relative)?)
    }

    /// Read the whole file at `path`.
    pub fn read_file(&self, path: &str) -> VfsResult<Vec<u8>> {
        let mut handle = self.open(path)?;
        let mut data = Vec::new();
        handle.read_to_end(&mut data)?;
        Ok(data)
    }

    /// List the directory at `path`, sorted by name.
    ///
    /// - The root lists the top-level segment of every mount prefix, plus
    ///   the contents of a backend mounted at `/`.
    /// - A mount point lists its backend's root.
    /// - An ancestor of mount points lists their next segments as
    ///   pseudo-directories.
    /// - Anything else inside a mount lists through its backend.
    ///
    /// Listings inside a backend also show mount points nested below them.
    pub fn list_dir(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        let path = path::to_absolute(path);
        let table = self.table.read();
        let nested = synth::child_names(&table, &path);

        let entries = match synth::classify(&table, &path) {
            PathClass::Root(None) => synth::pseudo_entries(&nested),
            PathClass::Root(Some(backend)) | PathClass::MountPoint(backend) => {
                synth::merge_listing(backend.read_dir(".")?, &nested)
            }
            PathClass::Ancestor(None) => synth::pseudo_entries(&nested),
            // The mounts below make this a directory whatever the backend
            // holds here, so a failed listing leaves just the mount names.
            PathClass::Ancestor(Some(resolved)) => {
                match resolved.backend.read_dir(&resolved.relative) {
                    Ok(entries) => synth::merge_listing(entries, &nested),
                    Err(e) => {
                        debug!(path = %path, error = %e, "backend cannot list mount ancestor");
                        synth::pseudo_entries(&nested)
                    }
                }
            }
            PathClass::Inside(resolved) => resolved.backend.read_dir(&resolved.relative)?,
            PathClass::Unmapped => return Err(VfsError::not_found(path)),
        };

        trace!(path = %path, entries = entries.len(), "list_dir");
        Ok(entries)
    }

    /// Get metadata for `path`.
    ///
    /// The root, mount points and their ancestors are reported as
    /// pseudo-directories. Paths inside a mount stat through the backend.
    pub fn stat(&self, path: &str) -> VfsResult<FileAttr> {
        let path = path::to_absolute(path);
        let table = self.table.read();

        match synth::classify(&table, &path) {
            PathClass::Root(_) | PathClass::MountPoint(_) | PathClass::Ancestor(_) => {
                Ok(synth::pseudo_attr())
            }
            PathClass::Inside(resolved) => Ok(resolved.backend.stat(&resolved.relative)?),
            PathClass::Unmapped => Err(VfsError::not_found(path)),
        }
    }
}

// An overlay is itself a backend, so overlays can be mounted inside each
// other. Backend-relative paths are read as paths under the overlay root.

impl OpenFs for OverlayFs {
    fn open(&self, path: &str) -> io::Result<FileHandle> {
        Ok(OverlayFs::open(self, path)?)
    }
}

impl ReadDirFs for OverlayFs {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        Ok(self.list_dir(path)?)
    }
}

impl StatFs for OverlayFs {
    fn stat(&self, path: &str) -> io::Result<FileAttr> {
        Ok(OverlayFs::stat(self, path)?)
    }
}
