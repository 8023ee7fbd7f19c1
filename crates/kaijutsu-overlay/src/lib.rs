//! # kaijutsu-overlay
//!
//! Read-only virtual filesystem overlay for kaijutsu.
//!
//! An overlay presents one tree built from many backends, each mounted at a
//! path prefix:
//! - Requests route to the mount with the longest matching prefix
//! - Ancestors of mount points appear as synthesized directories
//! - Backends declare how much they support (open, list, stat) and the
//!   overlay fills in the rest through open handles
//! - Mounts can be added and removed while readers are active

pub mod config;
pub mod vfs;
pub mod walk;

pub use config::{ConfigError, MountConfig, OverlayConfig, load_config, parse_config};
pub use vfs::{
    Backend, Capability, DirEntry, FileAttr, FileHandle, FileType, LocalBackend, MemoryBackend,
    MountInfo, OpenFs, OverlayFs, ReadDirFs, StatFs, VfsError, VfsFile, VfsResult,
};
pub use walk::{WalkEntry, walk, walk_files};
