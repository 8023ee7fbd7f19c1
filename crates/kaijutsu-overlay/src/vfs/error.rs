//! Overlay error types.

use std::io;
use thiserror::Error;

/// Overlay error type.
///
/// Mount-table failures (`InvalidPrefix`, `AlreadyMounted`, `NotMounted`)
/// and lookup failures (`NotFound`, `Backend`) share one enum so callers can
/// use `?` across both kinds of operation.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Prefix does not normalize to an absolute path.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Prefix is already bound to a backend.
    #[error("prefix already mounted: {0}")]
    AlreadyMounted(String),

    /// No backend is bound at this exact prefix.
    #[error("prefix not mounted: {0}")]
    NotMounted(String),

    /// Path matches no mount and no mount lies beneath it.
    #[error("not found: {0}")]
    NotFound(String),

    /// Error returned by a backend, passed through untouched.
    #[error(transparent)]
    Backend(#[from] io::Error),
}

impl VfsError {
    /// Create an InvalidPrefix error.
    pub fn invalid_prefix(prefix: &str, normalized: &str) -> Self {
        Self::InvalidPrefix(format!("{:?} (normalized to {:?})", prefix, normalized))
    }

    /// Create an AlreadyMounted error.
    pub fn already_mounted(prefix: impl Into<String>) -> Self {
        Self::AlreadyMounted(prefix.into())
    }

    /// Create a NotMounted error.
    pub fn not_mounted(prefix: impl Into<String>) -> Self {
        Self::NotMounted(prefix.into())
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Returns true for `NotFound`, and for backend errors of kind
    /// [`io::ErrorKind::NotFound`].
    pub fn is_not_found(&self) -> bool {
        match self {
            VfsError::NotFound(_) => true,
            VfsError::Backend(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Convert VfsError to std::io::Error so an overlay can serve as a backend.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::InvalidPrefix(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            VfsError::AlreadyMounted(msg) => io::Error::new(io::ErrorKind::AlreadyExists, msg),
            VfsError::NotMounted(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::Backend(e) => e,
        }
    }
}

/// Overlay result type.
pub type VfsResult<T> = Result<T, VfsError>;
