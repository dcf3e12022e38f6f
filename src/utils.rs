//! Filesystem primitives shared by the store and the global operations.
//!
//! Every mutation here is safe against concurrent, uncoordinated peers:
//! deleting something already gone is success, and no primitive holds any
//! lock across a read-then-act gap.

use std::fs::{self, File, FileTimes};
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Delete a file if it is present.
///
/// Returns `true` if this call removed the file. "Already gone", including
/// a peer deleting it between our check and the unlink, is success.
pub(crate) fn delete_if_present(path: &Path) -> CacheResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "file already removed by a peer");
            Ok(false)
        }
        Err(err) => Err(CacheError::io(path, err)),
    }
}

/// Recursively delete a subtree. An absent subtree is success.
pub(crate) fn remove_tree(root: &Path) -> CacheResult<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CacheError::io(root, err)),
    }
}

/// Stamp a file's access time with "now", refreshing its recency signal.
///
/// Best-effort: mounts that restrict timestamp updates lose nothing but
/// eviction-ordering quality, so failures are only logged.
pub(crate) fn mark_accessed(path: &Path) {
    let marked = File::open(path)
        .and_then(|file| file.set_times(FileTimes::new().set_accessed(SystemTime::now())));
    if let Err(err) = marked {
        debug!(path = %path.display(), error = %err, "could not refresh access time");
    }
}

/// Restore a file's access and modification times after an inspection read,
/// so looking at a record does not disturb its recency signal.
///
/// Best-effort for the same reason as [`mark_accessed`].
pub(crate) fn restore_times(file: &File, path: &Path, accessed: SystemTime, modified: SystemTime) {
    let times = FileTimes::new().set_accessed(accessed).set_modified(modified);
    if let Err(err) = file.set_times(times) {
        debug!(path = %path.display(), error = %err, "could not restore file times");
    }
}
