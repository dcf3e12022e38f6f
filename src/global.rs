//! Cache-root-wide maintenance operations.
//!
//! These span every user and namespace beneath a root, independent of any
//! single store's configuration. They carry the same guarantees as their
//! per-namespace counterparts: absent trees are success, deletes tolerate
//! concurrent deleters, and size figures are point-in-time approximations.

use std::path::Path;

use crate::error::CacheResult;
use crate::evict;
use crate::utils;

/// Recursively delete an entire cache root. An absent root is success.
///
/// # Example
/// ```
/// use file_cache::{global, Cache, CacheConfig};
///
/// let root = tempfile::tempdir().unwrap();
/// let cache_root = root.path().join("cache");
/// let config = CacheConfig::builder().cache_root(&cache_root).build().unwrap();
/// Cache::new(config).set("key", "value").unwrap();
///
/// global::clear(&cache_root).unwrap();
/// assert!(!cache_root.exists());
/// ```
pub fn clear(cache_root: &Path) -> CacheResult<()> {
    utils::remove_tree(cache_root)
}

/// Delete exactly the stale entries across every user and namespace under
/// `cache_root`. Returns the number of entries removed.
pub fn purge(cache_root: &Path) -> CacheResult<u64> {
    evict::purge_subtree(cache_root)
}

/// Approximate on-disk byte size of everything under `cache_root`,
/// as of call time.
pub fn size(cache_root: &Path) -> CacheResult<u64> {
    evict::subtree_size(cache_root)
}

/// Evict entries across the whole root (nearest expiration first, then
/// least recently used) until it fits `target_bytes`.
///
/// Returns `false` if entries remained but none could be removed.
pub fn reduce_size(cache_root: &Path, target_bytes: u64) -> CacheResult<bool> {
    let outcome = evict::reduce_subtree(cache_root, target_bytes)?;
    Ok(outcome.reached_target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::config::{CacheConfig, Ttl};

    fn cache(root: &Path, user: &str, namespace: &str) -> Cache {
        let config = CacheConfig::builder()
            .cache_root(root)
            .user(user)
            .namespace(namespace)
            .build()
            .unwrap();
        Cache::new(config)
    }

    #[test]
    fn test_global_ops_span_users_and_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");

        let alice = cache(&root, "alice", "sessions");
        let bob = cache(&root, "bob", "reports");

        alice.set("k", "alice data").unwrap();
        bob.set_with_ttl("k", "bob data", Ttl::Now).unwrap();

        assert_eq!(
            size(&root).unwrap(),
            alice.size().unwrap() + bob.size().unwrap()
        );

        // Purge reaches bob's stale entry but leaves alice's fresh one.
        assert_eq!(purge(&root).unwrap(), 1);
        assert!(alice.contains("k").unwrap());
        assert!(bob.get_stale::<String>("k").unwrap().is_none());
    }

    #[test]
    fn test_global_reduce_size() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");

        let alice = cache(&root, "alice", "a");
        let bob = cache(&root, "bob", "b");
        for i in 0..4 {
            alice.set(&format!("a{}", i), "0123456789").unwrap();
            bob.set(&format!("b{}", i), "0123456789").unwrap();
        }

        assert!(reduce_size(&root, 0).unwrap());
        assert_eq!(size(&root).unwrap(), 0);
    }

    #[test]
    fn test_clear_absent_root_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");

        clear(&missing).unwrap();
        assert_eq!(size(&missing).unwrap(), 0);
        assert_eq!(purge(&missing).unwrap(), 0);
        assert!(reduce_size(&missing, 0).unwrap());
    }
}
