//! Error types for the file cache library.
//!
//! This module defines a comprehensive error type that covers all failure modes
//! of the cache operations, avoiding panics in favor of explicit error handling.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The main error type for cache operations.
///
/// This enum covers all possible error conditions that can occur when
/// interacting with the cache, from invalid configuration to filesystem
/// failures. Anticipated cross-process races (a file deleted by a peer, a
/// directory already created by a peer) are never surfaced through this type;
/// they are absorbed by the operations themselves.
#[derive(Debug)]
pub enum CacheError {
    /// The configuration supplied at construction was invalid
    /// (zero max size, shard depth beyond the digest length, empty segment).
    Configuration(String),

    /// The provided key is invalid (empty).
    InvalidKey(String),

    /// The provided value could not be serialized for storage.
    InvalidValue(String),

    /// A configured path element contained a parent-directory traversal
    /// sequence that would escape the cache root.
    IllegalPath(String),

    /// An unexpected I/O error occurred at the given path.
    Io { path: PathBuf, source: io::Error },

    /// A stored record failed to decode. Read paths treat this as
    /// "entry absent"; it is surfaced only by the codec itself.
    CorruptRecord { path: PathBuf, detail: String },
}

impl CacheError {
    /// Build an `Io` error carrying the failing path.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a `CorruptRecord` error for the record at `path`.
    pub(crate) fn corrupt(path: &Path, detail: impl fmt::Display) -> Self {
        CacheError::CorruptRecord {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
            CacheError::InvalidKey(reason) => write!(f, "invalid key: {}", reason),
            CacheError::InvalidValue(reason) => write!(f, "invalid value: {}", reason),
            CacheError::IllegalPath(element) => {
                write!(f, "illegal path element: '{}'", element)
            }
            CacheError::Io { path, source } => {
                write!(f, "I/O error at '{}': {}", path.display(), source)
            }
            CacheError::CorruptRecord { path, detail } => {
                write!(f, "corrupt record at '{}': {}", path.display(), detail)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
