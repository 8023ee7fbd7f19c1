//! Mount table with longest-prefix routing.
//!
//! Holds the `(prefix, backend)` bindings and resolves overlay paths to a
//! backend plus a backend-relative path. The table itself is not
//! synchronized; [`OverlayFs`](super::OverlayFs) owns it behind a lock.

use tracing::{debug, trace};

use super::error::{VfsError, VfsResult};
use super::ops::{Backend, Capability};
use super::path;

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// The mount prefix (e.g., "/mnt/project").
    pub prefix: String,
    /// Capability layer of the mounted backend.
    pub capability: Capability,
}

/// A single binding. Never mutated after insertion.
#[derive(Debug)]
struct Mount {
    prefix: String,
    backend: Backend,
}

/// Result of resolving an overlay path against the table.
#[derive(Debug)]
pub struct Resolved<'t> {
    /// Prefix of the matching mount.
    pub prefix: &'t str,
    /// The matching backend.
    pub backend: &'t Backend,
    /// Path relative to the backend root; `"."` for the root itself.
    pub relative: String,
}

/// Ordered set of mount bindings.
///
/// Mounts are kept sorted longest prefix first, so the first match while
/// scanning is the most specific one. If `/mnt` and `/mnt/project` are both
/// mounted, `/mnt/project/src/main.rs` resolves to `/mnt/project`.
#[derive(Debug, Default)]
pub struct MountTable {
    mounts: Vec<Mount>,
}

impl MountTable {
    /// Create a new empty mount table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a mount prefix, rejecting anything that is not absolute.
    pub fn normalize_prefix(prefix: &str) -> VfsResult<String> {
        let normalized = path::clean(prefix);
        if !path::is_absolute(&normalized) {
            return Err(VfsError::invalid_prefix(prefix, &normalized));
        }
        Ok(normalized)
    }

    /// Bind `backend` at `prefix`.
    ///
    /// Returns the normalized prefix. Fails if the prefix is not absolute
    /// after normalization or is already bound.
    pub fn insert(&mut self, prefix: &str, backend: Backend) -> VfsResult<String> {
        let prefix = Self::normalize_prefix(prefix)?;
        if self.contains(&prefix) {
            return Err(VfsError::already_mounted(prefix));
        }

        debug!(prefix = %prefix, capability = ?backend.capability(), "mount");
        self.mounts.push(Mount {
            prefix: prefix.clone(),
            backend,
        });
        // Stable sort: equal-length prefixes keep insertion order.
        self.mounts.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(prefix)
    }

    /// Remove the binding at `prefix`, returning its backend.
    ///
    /// The backend is handed back untouched; nothing is closed or flushed.
    pub fn remove(&mut self, prefix: &str) -> VfsResult<Backend> {
        let prefix = Self::normalize_prefix(prefix)?;
        let index = self
            .mounts
            .iter()
            .position(|m| m.prefix == prefix)
            .ok_or_else(|| VfsError::not_mounted(prefix.as_str()))?;

        debug!(prefix = %prefix, "unmount");
        Ok(self.mounts.remove(index).backend)
    }

    /// Returns true if a backend is bound at exactly this normalized prefix.
    pub fn contains(&self, prefix: &str) -> bool {
        self.get(prefix).is_some()
    }

    /// Backend bound at exactly this normalized prefix.
    pub fn get(&self, prefix: &str) -> Option<&Backend> {
        self.mounts
            .iter()
            .find(|m| m.prefix == prefix)
            .map(|m| &m.backend)
    }

    /// Find the mount for a clean absolute path.
    ///
    /// A mount matches if the path equals its prefix or lies below it. The
    /// first match in table order is the longest one.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        let resolved = self.mounts.iter().find_map(|m| {
            path::strip_ancestor(&m.prefix, path).map(|relative| Resolved {
                prefix: m.prefix.as_str(),
                backend: &m.backend,
                relative,
            })
        });

        match &resolved {
            Some(r) => trace!(path = %path, prefix = %r.prefix, relative = %r.relative, "resolved"),
            None => trace!(path = %path, "no mount"),
        }
        resolved
    }

    /// All mount prefixes, longest first.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|m| m.prefix.as_str())
    }

    /// List all current mounts, longest prefix first.
    pub fn list(&self) -> Vec<MountInfo> {
        self.mounts
            .iter()
            .map(|m| MountInfo {
                prefix: m.prefix.clone(),
                capability: m.backend.capability(),
            })
            .collect()
    }

    /// Number of mounts.
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    /// Returns true if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}
