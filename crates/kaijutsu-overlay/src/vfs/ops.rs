//! Backend capability traits.
//!
//! A backend is any filesystem-like object the overlay can delegate to. The
//! only required capability is opening a file by relative path; listing and
//! metadata are optional layers on top:
//!
//! - [`OpenFs`] - open by relative path (required)
//! - [`ReadDirFs`] - `OpenFs` + directory listing
//! - [`StatFs`] - `ReadDirFs` + metadata
//!
//! [`Backend`] records which layer a mounted backend provides and dispatches
//! on it explicitly. Missing layers are emulated through the handle returned
//! by `open`.
//!
//! Paths passed to backends are always relative: `"."` names the backend's
//! own root, anything else is slash-separated with no leading `/`.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use super::types::{DirEntry, FileAttr};

/// An open file or directory handed out by a backend.
///
/// The overlay returns handles to the caller as-is and never intercepts
/// reads on them.
pub trait VfsFile: Read + Send {
    /// Metadata of the open file.
    fn stat(&self) -> io::Result<FileAttr>;

    /// Entries of the open directory.
    ///
    /// Handles for regular files keep the default, which fails.
    fn read_dir(&mut self) -> io::Result<Vec<DirEntry>> {
        Err(io::Error::new(io::ErrorKind::NotADirectory, "not a directory"))
    }
}

/// Owned handle returned by [`OpenFs::open`].
pub type FileHandle = Box<dyn VfsFile>;

/// Open by relative path. The one capability every backend must have.
pub trait OpenFs: Send + Sync {
    /// Open the file or directory at `path`.
    fn open(&self, path: &str) -> io::Result<FileHandle>;
}

/// Backends that can list directories without going through a handle.
pub trait ReadDirFs: OpenFs {
    /// List entries in the directory at `path`.
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;
}

/// Backends that can report metadata without going through a handle.
pub trait StatFs: ReadDirFs {
    /// Get metadata for the file or directory at `path`.
    fn stat(&self, path: &str) -> io::Result<FileAttr>;
}

/// Which capability layer a backend provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Open only.
    Open,
    /// Open and list.
    ReadDir,
    /// Open, list and stat.
    Stat,
}

/// A mounted backend, tagged by its capability layer.
#[derive(Clone)]
pub enum Backend {
    Open(Arc<dyn OpenFs>),
    ReadDir(Arc<dyn ReadDirFs>),
    Stat(Arc<dyn StatFs>),
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&self.capability()).finish()
    }
}

impl Backend {
    /// Wrap a backend that can only open files.
    pub fn openable(fs: impl OpenFs + 'static) -> Self {
        Self::Open(Arc::new(fs))
    }

    /// Wrap a backend that can open and list.
    pub fn listable(fs: impl ReadDirFs + 'static) -> Self {
        Self::ReadDir(Arc::new(fs))
    }

    /// Wrap a backend with every capability.
    pub fn statable(fs: impl StatFs + 'static) -> Self {
        Self::Stat(Arc::new(fs))
    }

    /// The capability layer of this backend.
    pub fn capability(&self) -> Capability {
        match self {
            Backend::Open(_) => Capability::Open,
            Backend::ReadDir(_) => Capability::ReadDir,
            Backend::Stat(_) => Capability::Stat,
        }
    }

    /// Open `path` in the backend.
    pub fn open(&self, path: &str) -> io::Result<FileHandle> {
        match self {
            Backend::Open(fs) => fs.open(path),
            Backend::ReadDir(fs) => fs.open(path),
            Backend::Stat(fs) => fs.open(path),
        }
    }

    /// List `path`, emulating through an open handle when the backend
    /// cannot list directly.
    pub fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut entries = match self {
            Backend::Open(fs) => fs.open(path)?.read_dir()?,
            Backend::ReadDir(fs) => fs.read_dir(path)?,
            Backend::Stat(fs) => fs.read_dir(path)?,
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Stat `path`, emulating through an open handle when the backend
    /// cannot stat directly.
    pub fn stat(&self, path: &str) -> io::Result<FileAttr> {
        match self {
            Backend::Open(fs) => fs.open(path)?.stat(),
            Backend::ReadDir(fs) => fs.open(path)?.stat(),
            Backend::Stat(fs) => fs.stat(path),
        }
    }
}

impl From<Arc<dyn OpenFs>> for Backend {
    fn from(fs: Arc<dyn OpenFs>) -> Self {
        Self::Open(fs)
    }
}

impl From<Arc<dyn ReadDirFs>> for Backend {
    fn from(fs: Arc<dyn ReadDirFs>) -> Self {
        Self::ReadDir(fs)
    }
}

impl From<Arc<dyn StatFs>> for Backend {
    fn from(fs: Arc<dyn StatFs>) -> Self {
        Self::Stat(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::OverlayFs;
    use crate::vfs::backends::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hides every capability but `open`.
    struct OpenOnly(MemoryBackend);

    impl OpenFs for OpenOnly {
        fn open(&self, path: &str) -> io::Result<FileHandle> {
            self.0.open(path)
        }
    }

    /// Lists natively but cannot stat, counting native listings.
    struct ListOnly {
        inner: MemoryBackend,
        listings: AtomicUsize,
    }

    impl ListOnly {
        fn new(inner: MemoryBackend) -> Self {
            Self {
                inner,
                listings: AtomicUsize::new(0),
            }
        }
    }

    impl OpenFs for ListOnly {
        fn open(&self, path: &str) -> io::Result<FileHandle> {
            self.inner.open(path)
        }
    }

    impl ReadDirFs for ListOnly {
        fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            self.inner.read_dir(path)
        }
    }

    fn tree() -> MemoryBackend {
        MemoryBackend::new()
            .with_file("b.txt", b"bee")
            .with_file("a.txt", b"ay")
            .with_dir("sub")
    }

    #[test]
    fn test_capability_tags() {
        assert_eq!(Backend::openable(OpenOnly(tree())).capability(), Capability::Open);
        assert_eq!(Backend::statable(tree()).capability(), Capability::Stat);
    }

    #[test]
    fn test_read_dir_fallback_through_open() {
        let backend = Backend::openable(OpenOnly(tree()));
        let names: Vec<_> = backend
            .read_dir(".")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    }

    #[test]
    fn test_stat_fallback_through_open() {
        let backend = Backend::openable(OpenOnly(tree()));
        let attr = backend.stat("b.txt").unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 3);
        assert!(backend.stat("sub").unwrap().is_dir());
    }

    #[test]
    fn test_fallback_read_dir_on_file_fails() {
        let backend = Backend::openable(OpenOnly(tree()));
        let err = backend.read_dir("a.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
    }

    #[test]
    fn test_listable_lists_natively_and_stats_through_open() {
        let list_only = Arc::new(ListOnly::new(tree()));
        let backend = Backend::from(list_only.clone() as Arc<dyn ReadDirFs>);
        assert_eq!(backend.capability(), Capability::ReadDir);
        assert_eq!(Backend::listable(ListOnly::new(tree())).capability(), Capability::ReadDir);

        let names: Vec<_> = backend
            .read_dir(".")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(list_only.listings.load(Ordering::SeqCst), 1);

        let attr = backend.stat("b.txt").unwrap();
        assert!(attr.is_file());
        assert_eq!(attr.size, 3);
        assert!(backend.stat("sub").unwrap().is_dir());
        assert_eq!(list_only.listings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listable_through_overlay() {
        let list_only = Arc::new(ListOnly::new(tree()));
        let fs = OverlayFs::new();
        fs.mount("/lst", Backend::from(list_only.clone() as Arc<dyn ReadDirFs>))
            .unwrap();

        assert_eq!(
            fs.list_dir("/lst").unwrap(),
            vec![
                DirEntry::file("a.txt"),
                DirEntry::file("b.txt"),
                DirEntry::directory("sub"),
            ]
        );
        assert_eq!(list_only.listings.load(Ordering::SeqCst), 1);
        assert_eq!(fs.stat("/lst/a.txt").unwrap().size, 2);
        assert!(fs.stat("/lst/sub").unwrap().is_dir());
        assert!(fs.stat("/lst/missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_shared_backend_from_arc() {
        let shared: Arc<dyn StatFs> = Arc::new(tree());
        let a = Backend::from(shared.clone());
        let b = Backend::from(shared);
        assert_eq!(a.capability(), Capability::Stat);
        assert_eq!(a.read_dir(".").unwrap(), b.read_dir(".").unwrap());
    }
}
