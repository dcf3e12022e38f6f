//! The main cache interface.
//!
//! This module provides the primary `Cache` type that users interact with.
//! It wraps the internal store and provides a clean API over the shared
//! on-disk state.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::{CacheConfig, Ttl};
use crate::entry::Expiration;
use crate::error::CacheResult;
use crate::stats::{CacheStats, StatsSnapshot};
use crate::store::Store;

/// A filesystem-backed cache shared by independent processes on one machine,
/// with per-entry TTL and size-bounded eviction.
///
/// # Features
/// - **Process-shared**: every process opening the same root, user, and
///   namespace sees the same entries; there is no cache server and no lock.
/// - **TTL support**: entries can be perpetual, born stale, or expire at a
///   point in time; staleness is evaluated lazily at read time.
/// - **Bounded size**: with a configured `max_size`, each `set` first evicts
///   entries (nearest expiration, then least recently used) so the
///   namespace stays near the bound.
/// - **Race-tolerant**: concurrent mutators are expected; deleting something
///   already gone and creating a directory that already exists are success.
///
/// # Example
/// ```
/// use file_cache::{Cache, CacheConfig, Ttl};
/// use std::time::Duration;
///
/// let root = tempfile::tempdir().unwrap();
/// let config = CacheConfig::builder()
///     .cache_root(root.path())
///     .namespace("sessions")
///     .default_ttl(Ttl::After(Duration::from_secs(300)))
///     .build()
///     .unwrap();
///
/// let cache = Cache::new(config);
///
/// cache.set("user:123", "Alice").unwrap();
/// let value: Option<String> = cache.get("user:123").unwrap();
/// assert_eq!(value.as_deref(), Some("Alice"));
/// ```
#[derive(Debug, Clone)]
pub struct Cache {
    /// Internal store.
    store: Arc<Store>,
}

impl Cache {
    /// Create a new cache handle with the given configuration.
    ///
    /// Construction touches no files; directories appear on first write.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    /// ```
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Arc::new(Store::new(config)),
        }
    }

    /// Store a value under `key` using the configured default TTL.
    ///
    /// The value is serialized into the entry record; any serde-serializable
    /// value graph works. A later `set` with the same key replaces the whole
    /// record, value and timestamps alike.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("string_key", "string value").unwrap();
    /// cache.set("list_key", &vec![1, 2, 3, 4]).unwrap();
    /// ```
    pub fn set<T>(&self, key: &str, value: &T) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.store.set(key, value, None)
    }

    /// Store a value with an explicit TTL, overriding the configured default.
    ///
    /// `Ttl::After(Duration::ZERO)` and `Ttl::Now` both produce an entry
    /// that is stale immediately (reachable only via [`Cache::get_stale`]).
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig, Ttl};
    /// use std::time::Duration;
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set_with_ttl("session", "data", Ttl::After(Duration::from_secs(3600))).unwrap();
    /// cache.set_with_ttl("pinned", "data", Ttl::Never).unwrap();
    /// ```
    pub fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Ttl) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.store.set(key, value, Some(ttl))
    }

    /// Get a fresh value from the cache.
    ///
    /// Returns `None` if the entry doesn't exist, is stale, or doesn't
    /// decode. A returned value is always a fresh deep copy of what was
    /// stored; mutating it never affects the cached record. When
    /// `auto_remove_stale` is configured, a stale entry found here is
    /// deleted on the way out.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    /// cache.set("key", "value").unwrap();
    ///
    /// match cache.get::<String>("key").unwrap() {
    ///     Some(value) => println!("Found: {:?}", value),
    ///     None => println!("Not found"),
    /// }
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        self.store.get(key)
    }

    /// Get a value only if its entry exists and is currently stale.
    ///
    /// Useful as a fallback when recomputation fails and yesterday's answer
    /// beats no answer. This never deletes the entry, regardless of the
    /// `auto_remove_stale` policy. A concurrent `get` from another handle
    /// or process may still delete it mid-inspection, in which case this
    /// returns `None`.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig, Ttl};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder()
    ///     .cache_root(root.path())
    ///     .auto_remove_stale(false)
    ///     .build()
    ///     .unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set_with_ttl("report", "stale but useful", Ttl::Now).unwrap();
    /// assert!(cache.get::<String>("report").unwrap().is_none());
    /// assert!(cache.get_stale::<String>("report").unwrap().is_some());
    /// ```
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        self.store.get_stale(key)
    }

    /// Check if a fresh entry exists for `key`.
    ///
    /// Note: this does NOT refresh the entry's access time, so probing
    /// keys never distorts eviction order.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// assert!(!cache.contains("key").unwrap());
    /// cache.set("key", "value").unwrap();
    /// assert!(cache.contains("key").unwrap());
    /// ```
    pub fn contains(&self, key: &str) -> CacheResult<bool> {
        self.store.contains(key)
    }

    /// Remove the entry for `key`.
    ///
    /// Removing a nonexistent entry succeeds and changes nothing; two
    /// processes removing the same key concurrently both succeed.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("key", "value").unwrap();
    /// cache.remove("key").unwrap();
    /// cache.remove("key").unwrap(); // Already gone: still success.
    /// ```
    pub fn remove(&self, key: &str) -> CacheResult<()> {
        self.store.remove(key)
    }

    /// Remove every entry in this namespace.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("key1", "value1").unwrap();
    /// cache.set("key2", "value2").unwrap();
    /// cache.clear().unwrap();
    /// assert!(!cache.contains("key1").unwrap());
    /// ```
    pub fn clear(&self) -> CacheResult<()> {
        self.store.clear()
    }

    /// Delete exactly the entries in this namespace that are stale at call
    /// time. Fresh and never-expiring entries are untouched, and the sweep
    /// does not disturb their access times.
    ///
    /// Returns the number of entries removed.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig, Ttl};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set_with_ttl("old", "v", Ttl::Now).unwrap();
    /// cache.set("kept", "v").unwrap();
    ///
    /// assert_eq!(cache.purge().unwrap(), 1);
    /// assert!(cache.contains("kept").unwrap());
    /// ```
    pub fn purge(&self) -> CacheResult<u64> {
        self.store.purge()
    }

    /// Approximate on-disk size of this namespace in bytes.
    ///
    /// Valid only as of call time: concurrent activity invalidates the
    /// figure the moment it is returned.
    pub fn size(&self) -> CacheResult<u64> {
        self.store.size()
    }

    /// Evict entries (nearest expiration first, then least recently used)
    /// until the namespace fits `target_bytes`.
    ///
    /// Returns `false` if entries remained but none could be removed; the
    /// cache is then larger than requested, which callers may tolerate.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("key1", "value1").unwrap();
    /// cache.set("key2", "value2").unwrap();
    ///
    /// assert!(cache.reduce_size(0).unwrap());
    /// assert_eq!(cache.size().unwrap(), 0);
    /// ```
    pub fn reduce_size(&self, target_bytes: u64) -> CacheResult<bool> {
        self.store.reduce_size(target_bytes)
    }

    /// When the entry for `key` was written, regardless of staleness.
    /// `None` only if no record exists.
    pub fn get_creation_time(&self, key: &str) -> CacheResult<Option<SystemTime>> {
        self.store.get_creation_time(key)
    }

    /// The stored expiration for `key`, regardless of staleness.
    /// `None` only if no record exists.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig, Expiration};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("pinned", "v").unwrap();
    /// assert_eq!(cache.get_expiration_time("pinned").unwrap(), Some(Expiration::Never));
    /// ```
    pub fn get_expiration_time(&self, key: &str) -> CacheResult<Option<Expiration>> {
        self.store.get_expiration_time(key)
    }

    /// Get a snapshot of this handle's statistics.
    ///
    /// Counters are local to the handle (and its clones), not shared
    /// through the filesystem.
    ///
    /// # Example
    /// ```
    /// use file_cache::{Cache, CacheConfig};
    ///
    /// let root = tempfile::tempdir().unwrap();
    /// let config = CacheConfig::builder().cache_root(root.path()).build().unwrap();
    /// let cache = Cache::new(config);
    ///
    /// cache.set("key", "value").unwrap();
    /// let _: Option<String> = cache.get("key").unwrap();        // Hit
    /// let _: Option<String> = cache.get("missing").unwrap();    // Miss
    ///
    /// let stats = cache.stats();
    /// assert_eq!(stats.hits, 1);
    /// assert_eq!(stats.misses, 1);
    /// ```
    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats().snapshot()
    }

    /// Get a reference to the internal statistics counters.
    ///
    /// This is useful for integrating with external metrics systems.
    pub fn stats_ref(&self) -> Arc<CacheStats> {
        self.store.stats()
    }

    /// The immutable configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        self.store.config()
    }
}
