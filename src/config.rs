//! Configuration for the file cache.
//!
//! This module provides a builder pattern for configuring cache behavior,
//! validated once at construction. A built configuration is immutable: the
//! paths derived from it can never drift out of sync with it afterward.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::entry::Expiration;
use crate::error::{CacheError, CacheResult};
use crate::hash;
use crate::identity::{self, EnvIdentity, IdentityResolver};
use crate::path;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Entry file mode used when none is configured: owner read/write only.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Directory under the system temp dir used when no cache root is configured.
const DEFAULT_ROOT_DIR: &str = "file-cache";

/// Time-to-live policy applied when an entry is written.
///
/// Resolved to a concrete [`Expiration`] at write time, so the stored record
/// carries an instant (or one of the two closed sentinels) rather than a
/// duration relative to an unspecified clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entries never go stale.
    Never,
    /// Entries are stale the moment they are written.
    Now,
    /// Entries go stale this long after being written.
    /// `After(Duration::ZERO)` behaves like [`Ttl::Now`].
    After(Duration),
}

impl Ttl {
    /// Resolve this policy against a write timestamp.
    pub(crate) fn resolve(self, written_at: SystemTime) -> Expiration {
        match self {
            Ttl::Never => Expiration::Never,
            Ttl::Now => Expiration::Now,
            Ttl::After(ttl) => Expiration::At(written_at + ttl),
        }
    }
}

/// Configuration for creating a new cache instance.
///
/// Use the builder to construct a configuration; `build()` validates
/// everything upfront and the result is read-only thereafter.
///
/// ```
/// use file_cache::{CacheConfig, Ttl};
/// use std::time::Duration;
///
/// let root = tempfile::tempdir().unwrap();
/// let config = CacheConfig::builder()
///     .cache_root(root.path())
///     .namespace("sessions")
///     .cache_depth(3)
///     .max_size(1_000_000)
///     .default_ttl(Ttl::After(Duration::from_secs(300)))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.namespace(), "sessions");
/// assert_eq!(config.max_size(), Some(1_000_000));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory shared by every user and namespace of this cache.
    pub(crate) cache_root: PathBuf,

    /// Identity segment partitioning the root.
    pub(crate) user: String,

    /// Namespace segment isolating one logical dataset from another.
    pub(crate) namespace: String,

    /// Number of single-character shard directories between the namespace
    /// and an entry file. 0 means no sharding.
    pub(crate) cache_depth: usize,

    /// Approximate size bound in bytes enforced by `set`.
    /// `None` means unbounded.
    pub(crate) max_size: Option<u64>,

    /// TTL applied by `set` when no explicit TTL is given.
    pub(crate) default_ttl: Ttl,

    /// Permission bits for entry files (unix only).
    pub(crate) file_mode: u32,

    /// Whether `get` deletes a stale entry it encounters.
    pub(crate) auto_remove_stale: bool,
}

impl CacheConfig {
    /// Start building a configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// The cache root directory.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// The user path segment.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The namespace path segment.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The shard depth.
    pub fn cache_depth(&self) -> usize {
        self.cache_depth
    }

    /// The size bound in bytes, if any.
    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    /// The default TTL.
    pub fn default_ttl(&self) -> Ttl {
        self.default_ttl
    }

    /// The entry file mode.
    pub fn file_mode(&self) -> u32 {
        self.file_mode
    }

    /// Whether `get` removes stale entries it encounters.
    pub fn auto_remove_stale(&self) -> bool {
        self.auto_remove_stale
    }
}

/// Builder for [`CacheConfig`].
#[derive(Debug)]
pub struct CacheConfigBuilder {
    cache_root: Option<PathBuf>,
    user: Option<String>,
    namespace: Option<String>,
    cache_depth: usize,
    max_size: Option<u64>,
    default_ttl: Ttl,
    file_mode: u32,
    auto_remove_stale: bool,
    identity: Box<dyn IdentityResolver>,
}

impl CacheConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            cache_root: None,
            user: None,
            namespace: None,
            cache_depth: 0,
            max_size: None,
            default_ttl: Ttl::Never,
            file_mode: DEFAULT_FILE_MODE,
            auto_remove_stale: true,
            identity: Box::new(EnvIdentity),
        }
    }

    /// Set the cache root directory.
    ///
    /// Defaults to `file-cache` under the system temp directory. The root is
    /// shared across processes and users; see the `path` module notes on its
    /// permissions.
    pub fn cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    /// Set the user segment explicitly instead of resolving it.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the namespace segment. Defaults to [`DEFAULT_NAMESPACE`].
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the shard depth: how many single-character subdirectory levels
    /// are derived from a key's digest. Bounds per-directory file counts
    /// for large caches. Defaults to 0 (no sharding).
    pub fn cache_depth(mut self, depth: usize) -> Self {
        self.cache_depth = depth;
        self
    }

    /// Bound the namespace's approximate on-disk size in bytes.
    ///
    /// Each `set` evicts entries first (nearest expiration, then least
    /// recently used) so the post-write footprint stays near the bound.
    /// Leave unset for an unbounded cache.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Set the TTL applied when `set` is called without an explicit one.
    /// Defaults to [`Ttl::Never`].
    pub fn default_ttl(mut self, ttl: Ttl) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the permission bits for entry files (unix only).
    /// Defaults to [`DEFAULT_FILE_MODE`], restricting entries to their owner.
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Control whether `get` deletes stale entries it encounters.
    /// Defaults to `true`. `get_stale` never deletes either way.
    pub fn auto_remove_stale(mut self, enabled: bool) -> Self {
        self.auto_remove_stale = enabled;
        self
    }

    /// Replace the identity resolver consulted when no explicit user
    /// segment is set.
    pub fn identity_resolver(mut self, resolver: impl IdentityResolver + 'static) -> Self {
        self.identity = Box::new(resolver);
        self
    }

    /// Validate and build the final configuration.
    pub fn build(self) -> CacheResult<CacheConfig> {
        if self.max_size == Some(0) {
            return Err(CacheError::Configuration(
                "max size must be nonzero; leave it unset for an unbounded cache".to_string(),
            ));
        }
        if self.cache_depth > hash::DIGEST_LEN {
            return Err(CacheError::Configuration(format!(
                "cache depth {} exceeds the digest length of {}",
                self.cache_depth,
                hash::DIGEST_LEN
            )));
        }

        let user = match self.user {
            Some(user) => user,
            None => identity::resolve_user(&*self.identity),
        };
        if user.is_empty() {
            return Err(CacheError::Configuration(
                "user segment must not be empty".to_string(),
            ));
        }
        path::validate_segment(&user)?;

        let namespace = self
            .namespace
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if namespace.is_empty() {
            return Err(CacheError::Configuration(
                "namespace must not be empty".to_string(),
            ));
        }
        path::validate_segment(&namespace)?;

        let cache_root = self
            .cache_root
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_ROOT_DIR));

        Ok(CacheConfig {
            cache_root,
            user,
            namespace,
            cache_depth: self.cache_depth,
            max_size: self.max_size,
            default_ttl: self.default_ttl,
            file_mode: self.file_mode,
            auto_remove_stale: self.auto_remove_stale,
        })
    }
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
