//! Recursive traversal of an overlay.
//!
//! Walks through [`OverlayFs::list_dir`], so pseudo-directories and mount
//! points are traversed exactly like backend directories. Each listing takes
//! the overlay lock on its own; a concurrent unmount shows up as an error
//! for the subtree it removed.

use crate::vfs::{FileType, OverlayFs, VfsResult, path};

/// One path visited by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute overlay path.
    pub path: String,
    /// Entry type as reported by its directory listing.
    pub kind: FileType,
}

/// Visit every entry below `root`, depth first, in name order.
///
/// `root` itself is not included. Symlinks are reported but not followed.
pub fn walk(fs: &OverlayFs, root: &str) -> VfsResult<Vec<WalkEntry>> {
    let root = path::to_absolute(root);
    let mut out = Vec::new();
    walk_dir(fs, &root, &mut out)?;
    Ok(out)
}

/// Paths of every regular file below `root`, in walk order.
pub fn walk_files(fs: &OverlayFs, root: &str) -> VfsResult<Vec<String>> {
    Ok(walk(fs, root)?
        .into_iter()
        .filter(|entry| entry.kind.is_file())
        .map(|entry| entry.path)
        .collect())
}

fn walk_dir(fs: &OverlayFs, dir: &str, out: &mut Vec<WalkEntry>) -> VfsResult<()> {
    for entry in fs.list_dir(dir)? {
        // Names with separators would alias other paths.
        if entry.name.is_empty() || entry.name.contains('/') {
            continue;
        }
        let child = path::join(dir, &entry.name);
        out.push(WalkEntry {
            path: child.clone(),
            kind: entry.kind,
        });
        if entry.kind.is_dir() {
            walk_dir(fs, &child, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{Backend, MemoryBackend};

    #[test]
    fn test_walk_includes_pseudo_directories() {
        let fs = OverlayFs::new();
        fs.mount(
            "/mnt/a",
            Backend::statable(MemoryBackend::new().with_file("x/y.txt", b"")),
        )
        .unwrap();

        let paths: Vec<_> = walk(&fs, "/").unwrap().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/mnt", "/mnt/a", "/mnt/a/x", "/mnt/a/x/y.txt"]);
    }

    #[test]
    fn test_walk_files_subtree() {
        let fs = OverlayFs::new();
        fs.mount(
            "/quux",
            Backend::statable(MemoryBackend::new().with_file("1.txt", b"").with_file("d/2.txt", b"")),
        )
        .unwrap();

        assert_eq!(walk_files(&fs, "/quux/d").unwrap(), vec!["/quux/d/2.txt"]);
        assert_eq!(walk_files(&fs, "quux").unwrap(), vec!["/quux/1.txt", "/quux/d/2.txt"]);
    }

    #[test]
    fn test_walk_unmapped_root() {
        let fs = OverlayFs::new();
        assert!(walk(&fs, "/nope").unwrap_err().is_not_found());
    }
}
