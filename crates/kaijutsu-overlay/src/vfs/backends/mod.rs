//! Overlay backends.
//!
//! Backends implement the capability traits in [`ops`](crate::vfs::ops).
//! Both built-in backends provide the full [`StatFs`](crate::vfs::StatFs)
//! layer.

mod local;
mod memory;

pub use local::{LocalBackend, LocalFile};
pub use memory::{MemoryBackend, MemoryFile};
