//! Virtual filesystem overlay.
//!
//! Composes independent backends into one read-only namespace by binding
//! each to a path prefix. Key components:
//!
//! - [`OverlayFs`] - Facade: mount, unmount, open, list, stat
//! - [`MountTable`] - Prefix bindings with longest-prefix routing
//! - [`synth`] - Pseudo-directories implied by nested mount points
//! - [`Backend`] - A mounted backend, tagged by capability layer
//! - [`MemoryBackend`] / [`LocalBackend`] - Built-in backends
//!
//! ## Design Decisions
//!
//! - **String paths**: Overlay paths are slash-separated strings, normalized
//!   lexically. Backends only ever see relative paths.
//! - **Longest-prefix routing**: Mounts are kept sorted longest first, so a
//!   linear scan finds the most specific match.
//! - **One lock**: A single reader/writer lock guards the table, held across
//!   the delegated backend call.

pub mod backends;
mod error;
mod mount;
mod ops;
mod overlay;
pub mod path;
pub mod synth;
mod types;

pub use backends::{LocalBackend, MemoryBackend};
pub use error::{VfsError, VfsResult};
pub use mount::{MountInfo, MountTable, Resolved};
pub use ops::{Backend, Capability, FileHandle, OpenFs, ReadDirFs, StatFs, VfsFile};
pub use overlay::OverlayFs;
pub use types::{DirEntry, FileAttr, FileType};
