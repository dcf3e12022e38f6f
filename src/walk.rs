//! Recursive traversal of a cache subtree.
//!
//! Produces a finite, restartable sequence of files with the metadata the
//! sweeps need, instead of threading callbacks through the walk. Entries
//! that vanish mid-walk (a peer deleting concurrently) are skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// One entry file discovered during a walk.
#[derive(Debug, Clone)]
pub(crate) struct WalkedFile {
    pub path: PathBuf,
    /// On-disk size in bytes, as of the walk.
    pub len: u64,
    /// Last access time; the recency signal for LRU eviction.
    pub accessed: SystemTime,
}

/// Collect every file under `root`, depth-first.
///
/// An absent root yields an empty sequence. The result is a point-in-time
/// snapshot: peers may add or remove entries the moment it returns.
pub(crate) fn walk_files(root: &Path) -> CacheResult<Vec<WalkedFile>> {
    let mut files = Vec::new();
    walk_into(root, &mut files)?;
    Ok(files)
}

fn walk_into(dir: &Path, files: &mut Vec<WalkedFile>) -> CacheResult<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(CacheError::io(dir, err)),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(CacheError::io(dir, err)),
        };
        let path = entry.path();
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "entry vanished mid-walk");
                continue;
            }
            Err(err) => return Err(CacheError::io(&path, err)),
        };

        if meta.is_dir() {
            walk_into(&path, files)?;
        } else {
            // Platforms without atime fall back to mtime; the ordering is
            // then write recency, which is the best signal available.
            let accessed = meta
                .accessed()
                .or_else(|_| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push(WalkedFile {
                path,
                len: meta.len(),
                accessed,
            });
        }
    }
    Ok(())
}
