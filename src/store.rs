//! Internal store implementation for the cache.
//!
//! This is the engine behind `Cache`: it maps keys to sharded entry files,
//! enforces the size bound before writes, and applies the expiration policy
//! on reads. Correctness under concurrent processes comes entirely from
//! idempotent, race-tolerant filesystem operations; there is no lock and no
//! coordination of any kind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::config::{CacheConfig, Ttl};
use crate::entry::{CacheEntry, Expiration};
use crate::error::{CacheError, CacheResult};
use crate::evict;
use crate::hash;
use crate::path;
use crate::stats::CacheStats;
use crate::utils;

/// The per-namespace cache engine.
///
/// This is the internal implementation; users should use `Cache` instead.
#[derive(Debug)]
pub(crate) struct Store {
    /// Immutable configuration for this store.
    config: CacheConfig,

    /// `root/user/namespace`, derived from the configuration once.
    namespace_root: PathBuf,

    /// Statistics for cache operations, local to this handle.
    stats: Arc<CacheStats>,
}

impl Store {
    /// Create a new store. No filesystem activity happens until the first
    /// operation; reading from a never-written namespace simply misses.
    pub fn new(config: CacheConfig) -> Self {
        let namespace_root =
            path::namespace_root(config.cache_root(), config.user(), config.namespace());
        Self {
            config,
            namespace_root,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// The entry file location for `key`.
    fn entry_path(&self, key: &str) -> CacheResult<PathBuf> {
        let digest = hash::digest(key)?;
        Ok(path::entry_location(
            &self.namespace_root,
            self.config.cache_depth(),
            &digest,
        ))
    }

    /// Store a value, replacing any existing record for the key.
    ///
    /// When a size bound is configured, the namespace is reduced to
    /// `max_size - len(new record)` (clamped at zero) before the write, so
    /// the post-write footprint stays near the bound.
    pub fn set<T>(&self, key: &str, value: &T, ttl: Option<Ttl>) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        let location = self.entry_path(key)?;
        let value =
            serde_json::to_value(value).map_err(|err| CacheError::InvalidValue(err.to_string()))?;

        let now = SystemTime::now();
        let expires_at = ttl.unwrap_or(self.config.default_ttl()).resolve(now);
        let encoded = CacheEntry::with_creation_time(value, expires_at, now).encode()?;

        if let Some(max_size) = self.config.max_size() {
            let target = max_size.saturating_sub(encoded.len() as u64);
            let outcome = evict::reduce_subtree(&self.namespace_root, target)?;
            self.stats.record_evictions(outcome.evicted);
        }

        path::ensure_cache_root(self.config.cache_root())?;
        path::ensure_entry_dirs(&location)?;
        self.write_record(&location, &encoded)?;
        self.stats.record_set();
        Ok(())
    }

    /// Retrieve a fresh value, deserialized into a fresh copy.
    ///
    /// A stale entry is treated as absent; when `auto_remove_stale` is on,
    /// it is also deleted (tolerating a peer getting there first). A record
    /// that is missing, corrupt, or not deserializable as `T` is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let location = self.entry_path(key)?;
        let entry = match self.read_record(&location)? {
            Some(entry) => entry,
            None => {
                self.stats.record_miss();
                return Ok(None);
            }
        };

        if entry.is_stale() {
            self.stats.record_expiration();
            self.stats.record_miss();
            if self.config.auto_remove_stale() {
                utils::delete_if_present(&location)?;
            }
            return Ok(None);
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                // Some mounts elide atime updates on read; stamp it so the
                // recency signal eviction relies on stays truthful.
                utils::mark_accessed(&location);
                self.stats.record_hit();
                Ok(Some(value))
            }
            Err(err) => {
                debug!(path = %location.display(), error = %err, "stored value does not match requested type");
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    /// Retrieve a value only if its entry exists and is currently stale.
    ///
    /// Never deletes anything, whatever the removal policy; a concurrent
    /// `get` may still race-delete the entry, which reads as absent here.
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let location = self.entry_path(key)?;
        let entry = match self.read_record(&location)? {
            Some(entry) => entry,
            None => return Ok(None),
        };
        if !entry.is_stale() {
            return Ok(None);
        }
        match serde_json::from_value(entry.value) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        }
    }

    /// Check whether a fresh entry exists for `key` without refreshing its
    /// access time.
    pub fn contains(&self, key: &str) -> CacheResult<bool> {
        let location = self.entry_path(key)?;
        Ok(evict::peek(&location)?.is_some_and(|entry| !entry.is_stale()))
    }

    /// Delete the entry for `key`. Deleting an absent entry is a no-op.
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        let location = self.entry_path(key)?;
        if utils::delete_if_present(&location)? {
            self.stats.record_remove();
        }
        Ok(())
    }

    /// Recursively delete the entire namespace subtree.
    pub fn clear(&self) -> CacheResult<()> {
        utils::remove_tree(&self.namespace_root)
    }

    /// Delete exactly the entries stale at call time; returns how many.
    pub fn purge(&self) -> CacheResult<u64> {
        let removed = evict::purge_subtree(&self.namespace_root)?;
        self.stats.record_purged(removed);
        Ok(removed)
    }

    /// Approximate on-disk size of the namespace, as of call time.
    pub fn size(&self) -> CacheResult<u64> {
        evict::subtree_size(&self.namespace_root)
    }

    /// Evict entries until the namespace fits `target_bytes`.
    ///
    /// Returns `false` (not an error) if entries remained but none could be
    /// removed; the cache is then larger than requested.
    pub fn reduce_size(&self, target_bytes: u64) -> CacheResult<bool> {
        let outcome = evict::reduce_subtree(&self.namespace_root, target_bytes)?;
        self.stats.record_evictions(outcome.evicted);
        Ok(outcome.reached_target)
    }

    /// The stored creation time, regardless of staleness.
    pub fn get_creation_time(&self, key: &str) -> CacheResult<Option<SystemTime>> {
        let location = self.entry_path(key)?;
        Ok(evict::peek(&location)?.map(|entry| entry.creation_time()))
    }

    /// The stored expiration, regardless of staleness.
    pub fn get_expiration_time(&self, key: &str) -> CacheResult<Option<Expiration>> {
        let location = self.entry_path(key)?;
        Ok(evict::peek(&location)?.map(|entry| entry.expiration()))
    }

    /// Get a reference to the statistics.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// The immutable configuration this store was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Plain record read: missing or corrupt is absent. The access-time
    /// side effect of reading is intentional here; inspection paths that
    /// must not leave one go through `evict::peek` instead.
    fn read_record(&self, location: &Path) -> CacheResult<Option<CacheEntry>> {
        let bytes = match fs::read(location) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CacheError::io(location, err)),
        };
        match CacheEntry::decode(&bytes, location) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                debug!(path = %location.display(), error = %err, "corrupt record treated as absent");
                Ok(None)
            }
        }
    }

    /// Overwrite the record at `location` with the configured file mode.
    fn write_record(&self, location: &Path, encoded: &[u8]) -> CacheResult<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.config.file_mode());
        }
        let mut file = options
            .open(location)
            .map_err(|err| CacheError::io(location, err))?;
        file.write_all(encoded)
            .map_err(|err| CacheError::io(location, err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Store {
        let config = CacheConfig::builder()
            .cache_root(dir.path())
            .user("tester")
            .namespace("unit")
            .build()
            .unwrap();
        Store::new(config)
    }

    #[test]
    fn test_basic_set_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("key1", "value1", None).unwrap();
        let result: Option<String> = store.get("key1").unwrap();
        assert_eq!(result.as_deref(), Some("value1"));
    }

    #[test]
    fn test_get_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let result: Option<String> = store.get("nonexistent").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(matches!(
            store.set("", "value", None),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get::<String>(""),
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_overwrite_replaces_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .set("key1", "value1", Some(Ttl::After(Duration::from_secs(60))))
            .unwrap();
        store.set("key1", "value2", None).unwrap();

        let result: Option<String> = store.get("key1").unwrap();
        assert_eq!(result.as_deref(), Some("value2"));
        // The overwrite also replaced the expiration with the default.
        assert_eq!(
            store.get_expiration_time("key1").unwrap(),
            Some(Expiration::Never)
        );
    }

    #[test]
    fn test_explicit_ttl_beats_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::builder()
            .cache_root(dir.path())
            .user("tester")
            .namespace("unit")
            .default_ttl(Ttl::After(Duration::from_secs(3600)))
            .build()
            .unwrap();
        let store = Store::new(config);

        store.set("born-stale", "v", Some(Ttl::Now)).unwrap();
        assert!(store.get::<String>("born-stale").unwrap().is_none());

        store.set("defaulted", "v", None).unwrap();
        assert!(store.get::<String>("defaulted").unwrap().is_some());
    }

    #[test]
    fn test_stale_removed_when_policy_on() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("stale", "v", Some(Ttl::Now)).unwrap();
        assert!(store.get::<String>("stale").unwrap().is_none());

        // The get deleted the record, so even get_stale finds nothing.
        assert!(store.get_stale::<String>("stale").unwrap().is_none());
    }

    #[test]
    fn test_stale_retained_when_policy_off() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::builder()
            .cache_root(dir.path())
            .user("tester")
            .namespace("unit")
            .auto_remove_stale(false)
            .build()
            .unwrap();
        let store = Store::new(config);

        store.set("stale", "v", Some(Ttl::Now)).unwrap();
        assert!(store.get::<String>("stale").unwrap().is_none());

        let kept: Option<String> = store.get_stale("stale").unwrap();
        assert_eq!(kept.as_deref(), Some("v"));
    }

    #[test]
    fn test_get_stale_ignores_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("fresh", "v", None).unwrap();
        assert!(store.get_stale::<String>("fresh").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("key1", "value1", None).unwrap();
        let location = store.entry_path("key1").unwrap();
        fs::write(&location, b"\x00garbage").unwrap();

        assert!(store.get::<String>("key1").unwrap().is_none());
        assert!(store.get_creation_time("key1").unwrap().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("key1", "value1", None).unwrap();
        store.remove("key1").unwrap();
        assert!(store.get::<String>("key1").unwrap().is_none());
        // Removing again is success, not an error.
        store.remove("key1").unwrap();
        store.remove("never-existed").unwrap();
    }

    #[test]
    fn test_clear_removes_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("a", "1", None).unwrap();
        store.set("b", "2", None).unwrap();
        store.clear().unwrap();

        assert!(store.get::<String>("a").unwrap().is_none());
        assert_eq!(store.size().unwrap(), 0);
        // Clearing an already-absent namespace is success.
        store.clear().unwrap();
    }

    #[test]
    fn test_size_and_reduce() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        for i in 0..5 {
            store.set(&format!("key_{}", i), "0123456789", None).unwrap();
        }
        let full = store.size().unwrap();
        assert!(full > 0);

        assert!(store.reduce_size(full / 2).unwrap());
        assert!(store.size().unwrap() <= full / 2);

        // An empty namespace trivially satisfies any target.
        assert!(store.reduce_size(0).unwrap());
        assert_eq!(store.size().unwrap(), 0);
    }

    #[test]
    fn test_timestamps_survive_staleness() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let config_off = CacheConfig::builder()
            .cache_root(dir.path())
            .user("tester")
            .namespace("unit")
            .auto_remove_stale(false)
            .build()
            .unwrap();
        let reader = Store::new(config_off);

        store.set("stale", "v", Some(Ttl::Now)).unwrap();
        assert!(reader.get_creation_time("stale").unwrap().is_some());
        assert_eq!(
            reader.get_expiration_time("stale").unwrap(),
            Some(Expiration::Now)
        );
        assert!(reader.get_creation_time("missing").unwrap().is_none());
    }

    #[test]
    fn test_stats_tracking() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set("key1", "value1", None).unwrap();
        let _ = store.get::<String>("key1").unwrap(); // Hit
        let _ = store.get::<String>("nonexistent").unwrap(); // Miss
        store.remove("key1").unwrap();

        let stats = store.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.sets(), 1);
        assert_eq!(stats.removes(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_file_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig::builder()
            .cache_root(dir.path())
            .user("tester")
            .namespace("unit")
            .file_mode(0o640)
            .build()
            .unwrap();
        let store = Store::new(config);

        store.set("key1", "value1", None).unwrap();
        let location = store.entry_path("key1").unwrap();
        let mode = fs::metadata(&location).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
