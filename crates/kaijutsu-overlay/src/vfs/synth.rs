//! Pseudo-directory synthesis.
//!
//! Mount prefixes imply directories that no backend provides: the overlay
//! root, and every ancestor of a nested mount point. This module classifies
//! an overlay path and builds the listings and metadata for those implied
//! directories.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use super::mount::{MountTable, Resolved};
use super::ops::Backend;
use super::path;
use super::types::{DirEntry, FileAttr};

/// How an overlay path relates to the mount table.
#[derive(Debug)]
pub enum PathClass<'t> {
    /// The overlay root. Carries the backend mounted at `/`, if any.
    Root(Option<&'t Backend>),
    /// Exactly a mount prefix.
    MountPoint(&'t Backend),
    /// Strict ancestor of at least one mount prefix, and not itself one.
    /// Carries the enclosing mount when the path also lies inside one.
    Ancestor(Option<Resolved<'t>>),
    /// Inside a mount, with no mount prefix below it.
    Inside(Resolved<'t>),
    /// Neither under any mount nor above one.
    Unmapped,
}

/// Classify a clean absolute overlay path.
pub fn classify<'t>(table: &'t MountTable, path: &str) -> PathClass<'t> {
    if path == "/" {
        return PathClass::Root(table.get("/"));
    }
    if let Some(backend) = table.get(path) {
        return PathClass::MountPoint(backend);
    }

    let resolved = table.resolve(path);
    if is_mount_ancestor(table, path) {
        return PathClass::Ancestor(resolved);
    }
    match resolved {
        Some(r) => PathClass::Inside(r),
        None => PathClass::Unmapped,
    }
}

/// Returns true if some mount prefix lies strictly below `path`.
pub fn is_mount_ancestor(table: &MountTable, path: &str) -> bool {
    table
        .prefixes()
        .any(|prefix| path::next_segment(path, prefix).is_some())
}

/// Distinct next segments of every mount prefix strictly below `path`.
///
/// For the root these are the top-level segments: mounting `/quux` and
/// `/a/b` yields `{"a", "quux"}`.
pub fn child_names(table: &MountTable, path: &str) -> BTreeSet<String> {
    table
        .prefixes()
        .filter_map(|prefix| path::next_segment(path, prefix))
        .map(str::to_string)
        .collect()
}

/// Pseudo-directory entries for the given names.
pub fn pseudo_entries(names: &BTreeSet<String>) -> Vec<DirEntry> {
    names.iter().map(DirEntry::directory).collect()
}

/// Metadata for a pseudo-directory.
pub fn pseudo_attr() -> FileAttr {
    FileAttr::pseudo_directory()
}

/// Merge a backend listing with the mount points nested beneath it.
///
/// Mount-point names replace same-named backend entries, since the mount
/// shadows whatever the backend has there. The result is sorted by name.
pub fn merge_listing(backend_entries: Vec<DirEntry>, mount_names: &BTreeSet<String>) -> Vec<DirEntry> {
    let mut merged: BTreeMap<String, DirEntry> = backend_entries
        .into_iter()
        .filter(|entry| !mount_names.contains(&entry.name))
        .map(|entry| (entry.name.clone(), entry))
        .collect();

    for name in mount_names {
        merged.insert(name.clone(), DirEntry::directory(name));
    }

    trace!(entries = merged.len(), mounts = mount_names.len(), "merged listing");
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::backends::MemoryBackend;

    fn table(prefixes: &[&str]) -> MountTable {
        let mut table = MountTable::new();
        for prefix in prefixes {
            table
                .insert(prefix, Backend::statable(MemoryBackend::new()))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_classify() {
        let t = table(&["/a/b", "/a/c", "/x"]);

        assert!(matches!(classify(&t, "/"), PathClass::Root(None)));
        assert!(matches!(classify(&t, "/a/b"), PathClass::MountPoint(_)));
        assert!(matches!(classify(&t, "/a"), PathClass::Ancestor(None)));
        assert!(matches!(classify(&t, "/x/y"), PathClass::Inside(_)));
        assert!(matches!(classify(&t, "/a/d"), PathClass::Unmapped));
        assert!(matches!(classify(&t, "/nope"), PathClass::Unmapped));
    }

    #[test]
    fn test_classify_ancestor_inside_mount() {
        let t = table(&["/a", "/a/b/c"]);
        match classify(&t, "/a/b") {
            PathClass::Ancestor(Some(r)) => {
                assert_eq!(r.prefix, "/a");
                assert_eq!(r.relative, "b");
            }
            other => panic!("unexpected class: {other:?}"),
        }
    }

    #[test]
    fn test_classify_root_mount() {
        let t = table(&["/"]);
        assert!(matches!(classify(&t, "/"), PathClass::Root(Some(_))));
        assert!(matches!(classify(&t, "/etc"), PathClass::Inside(_)));
    }

    #[test]
    fn test_child_names_root() {
        let t = table(&["/quux", "/corge", "/mnt/a", "/mnt/b", "/"]);
        let names: Vec<_> = child_names(&t, "/").into_iter().collect();
        assert_eq!(names, vec!["corge", "mnt", "quux"]);
    }

    #[test]
    fn test_child_names_nested() {
        let t = table(&["/a/b", "/a/c/d", "/a/c/e", "/ab"]);
        let names: Vec<_> = child_names(&t, "/a").into_iter().collect();
        assert_eq!(names, vec!["b", "c"]);
        let names: Vec<_> = child_names(&t, "/a/c").into_iter().collect();
        assert_eq!(names, vec!["d", "e"]);
        assert!(child_names(&t, "/a/b").is_empty());
    }

    #[test]
    fn test_merge_listing_mount_shadows_entry() {
        let backend = vec![DirEntry::file("b"), DirEntry::file("z.txt"), DirEntry::directory("a")];
        let mounts: BTreeSet<String> = ["b".to_string(), "m".to_string()].into();
        let merged = merge_listing(backend, &mounts);

        let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "m", "z.txt"]);
        assert!(merged[1].kind.is_dir());
    }
}
