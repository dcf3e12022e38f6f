//! Victim selection and subtree sweeps: purge, size accounting, and
//! size-bounded eviction.
//!
//! These operate on any subtree root, a single namespace or a whole cache
//! root alike, and tolerate concurrent, uncoordinated mutators throughout:
//! every enumeration is a point-in-time snapshot and every delete is
//! delete-if-present.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::entry::CacheEntry;
use crate::error::{CacheError, CacheResult};
use crate::utils;
use crate::walk;

/// Outcome of a size reduction.
#[derive(Debug)]
pub(crate) struct Reduction {
    /// Whether the subtree was brought down to the target.
    pub reached_target: bool,
    /// Number of entries evicted along the way.
    pub evicted: u64,
}

/// Read the record at `path` without disturbing its recency signal.
///
/// The file's access and modification times are restored after the read, so
/// inspection traffic (purges, victim scans, timestamp queries) never makes
/// an entry look recently used. Returns `None` if the file is gone or the
/// record does not decode.
pub(crate) fn peek(path: &Path) -> CacheResult<Option<CacheEntry>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CacheError::io(path, err)),
    };
    let meta = file.metadata().map_err(|err| CacheError::io(path, err))?;
    let accessed = meta.accessed().ok();
    let modified = meta.modified().ok();

    let mut bytes = Vec::with_capacity(meta.len() as usize);
    file.read_to_end(&mut bytes)
        .map_err(|err| CacheError::io(path, err))?;

    if let (Some(accessed), Some(modified)) = (accessed, modified) {
        utils::restore_times(&file, path, accessed, modified);
    }

    match CacheEntry::decode(&bytes, path) {
        Ok(entry) => Ok(Some(entry)),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "unreadable record treated as absent");
            Ok(None)
        }
    }
}

/// Choose the entry to delete next when reducing a subtree.
///
/// Every entry with a finite expiration competes on "expires soonest"; only
/// when none expires at all does the least recently accessed entry lose.
/// Exact ties break first-found. Records that fail to decode have no finite
/// expiration but still compete on access time, so they stay evictable.
pub(crate) fn select_victim(root: &Path) -> CacheResult<Option<PathBuf>> {
    let files = walk::walk_files(root)?;

    let mut soonest: Option<(SystemTime, usize)> = None;
    let mut least_recent: Option<usize> = None;

    for (index, file) in files.iter().enumerate() {
        if least_recent.map_or(true, |current| file.accessed < files[current].accessed) {
            least_recent = Some(index);
        }
        if let Some(entry) = peek(&file.path)? {
            if let Some(expires) = entry.expiration_instant() {
                if soonest.map_or(true, |(current, _)| expires < current) {
                    soonest = Some((expires, index));
                }
            }
        }
    }

    let victim = soonest.map(|(_, index)| index).or(least_recent);
    Ok(victim.map(|index| files[index].path.clone()))
}

/// Approximate on-disk byte size of a subtree, as of call time.
pub(crate) fn subtree_size(root: &Path) -> CacheResult<u64> {
    Ok(walk::walk_files(root)?.iter().map(|file| file.len).sum())
}

/// Delete exactly the entries that are stale at call time.
///
/// Fresh and never-expiring entries are untouched, and inspecting them does
/// not disturb their access times. Returns the number of entries removed.
pub(crate) fn purge_subtree(root: &Path) -> CacheResult<u64> {
    let now = SystemTime::now();
    let mut removed = 0;
    for file in walk::walk_files(root)? {
        if let Some(entry) = peek(&file.path)? {
            if entry.is_stale_at(now) && utils::delete_if_present(&file.path)? {
                removed += 1;
            }
        }
    }
    debug!(root = %root.display(), removed, "purge swept subtree");
    Ok(removed)
}

/// Evict victims until the subtree fits `target_bytes` or nothing is left
/// to evict. Falling short is a reported outcome, not an error.
pub(crate) fn reduce_subtree(root: &Path, target_bytes: u64) -> CacheResult<Reduction> {
    let mut evicted = 0;
    loop {
        let size = subtree_size(root)?;
        if size <= target_bytes {
            return Ok(Reduction {
                reached_target: true,
                evicted,
            });
        }
        match select_victim(root)? {
            Some(victim) => {
                if utils::delete_if_present(&victim)? {
                    evicted += 1;
                    debug!(victim = %victim.display(), "evicted entry");
                }
            }
            None => {
                warn!(
                    root = %root.display(),
                    size, target_bytes, "no removable entries; size target not reached"
                );
                return Ok(Reduction {
                    reached_target: false,
                    evicted,
                });
            }
        }
    }
}
