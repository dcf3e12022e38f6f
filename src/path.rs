//! Sharded filesystem layout for cache entries.
//!
//! An entry for digest `h` lives at `root/user/namespace/h[0]/…/h[d-1]/h`,
//! where `d` is the configured shard depth. The layout is a pure function of
//! its inputs, so independent processes compute identical paths for identical
//! keys. Directory creation is idempotent: a peer creating the same shard
//! directory concurrently is success, not an error.
//!
//! The cache root itself is made world-writable on creation so unrelated
//! identities can share one root. This is the long-standing layout contract
//! of the on-disk format; entry files themselves default to owner-only.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, CacheResult};

/// Mode for the shared cache root directory.
#[cfg(unix)]
const CACHE_ROOT_MODE: u32 = 0o777;

/// Reject a configured path element that could traverse out of the root.
pub(crate) fn validate_segment(segment: &str) -> CacheResult<()> {
    if segment.contains("..") {
        return Err(CacheError::IllegalPath(segment.to_string()));
    }
    Ok(())
}

/// The directory holding one user's namespace: `root/user/namespace`.
pub(crate) fn namespace_root(cache_root: &Path, user: &str, namespace: &str) -> PathBuf {
    cache_root.join(user).join(namespace)
}

/// The full path of the entry file for `digest` under a namespace root,
/// with one single-character shard directory per level of `depth`.
pub(crate) fn entry_location(namespace_root: &Path, depth: usize, digest: &str) -> PathBuf {
    let mut location = namespace_root.to_path_buf();
    for shard in digest.chars().take(depth) {
        location.push(shard.to_string());
    }
    location.push(digest);
    location
}

/// Create the cache root if absent, applying the shared (world-writable)
/// mode to a root this process created. Already-exists is success.
pub(crate) fn ensure_cache_root(cache_root: &Path) -> CacheResult<()> {
    if cache_root.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(cache_root).map_err(|err| CacheError::io(cache_root, err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // A peer racing us here may own the root; losing the chmod race is fine.
        if let Err(err) =
            fs::set_permissions(cache_root, fs::Permissions::from_mode(CACHE_ROOT_MODE))
        {
            tracing::debug!(path = %cache_root.display(), error = %err, "could not widen cache root mode");
        }
    }
    Ok(())
}

/// Create every shard directory leading to an entry file.
pub(crate) fn ensure_entry_dirs(entry_path: &Path) -> CacheResult<()> {
    if let Some(parent) = entry_path.parent() {
        fs::create_dir_all(parent).map_err(|err| CacheError::io(parent, err))?;
    }
    Ok(())
}
