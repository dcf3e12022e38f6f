//! # File Cache
//!
//! A filesystem-backed cache shared by independent processes on one machine,
//! with TTL expiration and size-bounded eviction.
//!
//! ## Features
//!
//! - **Process-shared**: entries live under a common cache root, sharded by
//!   user and namespace; any process computing the same key finds the same
//!   file. No cache server and no locks: concurrency is handled entirely by
//!   idempotent, race-tolerant filesystem operations.
//! - **TTL support**: entries can be perpetual, stale from birth, or expire
//!   at an instant; staleness is computed lazily at read time, never stored.
//! - **Bounded size**: a configured `max_size` makes each `set` evict
//!   entries first (nearest expiration, then least recently used), keeping
//!   the namespace near the bound.
//! - **Statistics**: track cache hits, misses, evictions, and more.
//! - **Zero unsafe code**: built entirely with safe Rust.
//!
//! ## Quick Start
//!
//! ```rust
//! use file_cache::{Cache, CacheConfig, Ttl};
//! use std::time::Duration;
//!
//! let root = tempfile::tempdir().unwrap();
//!
//! // Create a cache with configuration
//! let config = CacheConfig::builder()
//!     .cache_root(root.path())
//!     .namespace("queries")
//!     .max_size(10_000_000)
//!     .default_ttl(Ttl::After(Duration::from_secs(300)))
//!     .build()
//!     .unwrap();
//!
//! let cache = Cache::new(config);
//!
//! // Store and retrieve values
//! cache.set("user:123", "Alice").unwrap();
//!
//! if let Some(value) = cache.get::<String>("user:123").unwrap() {
//!     println!("Found: {:?}", value);
//! }
//!
//! // Set with a custom TTL
//! cache.set_with_ttl("session:abc", "session_data", Ttl::After(Duration::from_secs(60))).unwrap();
//!
//! // Check statistics
//! let stats = cache.stats();
//! println!("Hit rate: {:.1}%", stats.hit_rate);
//! ```
//!
//! ## Sharing Across Processes
//!
//! There is no in-memory state worth sharing: a `Cache` is a configuration
//! plus an on-disk tree. Two processes (or two handles) built with the same
//! root, user, and namespace read and write the same entries:
//!
//! ```rust
//! use file_cache::{Cache, CacheConfig};
//!
//! let root = tempfile::tempdir().unwrap();
//! let build = || {
//!     let config = CacheConfig::builder()
//!         .cache_root(root.path())
//!         .user("web")
//!         .namespace("pages")
//!         .build()
//!         .unwrap();
//!     Cache::new(config)
//! };
//!
//! let writer = build();
//! let reader = build();
//!
//! writer.set("front-page", "rendered html").unwrap();
//! assert!(reader.contains("front-page").unwrap());
//! ```
//!
//! ## Maintenance
//!
//! Beyond the per-namespace operations (`clear`, `purge`, `size`,
//! `reduce_size`), the [`global`] module offers the same sweeps over an
//! entire cache root, across all users and namespaces. That is the shape
//! cron-style housekeeping of a shared machine wants.

// Public API - stable in v1.0.0
pub mod cache;
pub mod config;
pub mod entry;
pub mod error;
pub mod global;
pub mod identity;
pub mod stats;

pub use cache::Cache;
pub use config::{CacheConfig, CacheConfigBuilder, Ttl, DEFAULT_FILE_MODE, DEFAULT_NAMESPACE};
pub use entry::{CacheEntry, Expiration};
pub use error::{CacheError, CacheResult};
pub use identity::{EnvIdentity, IdentityResolver, FALLBACK_USER};
pub use stats::{CacheStats, StatsSnapshot};

// Internal modules - not part of public API
pub(crate) mod evict;
pub(crate) mod hash;
pub(crate) mod path;
pub(crate) mod store;
pub(crate) mod utils;
pub(crate) mod walk;

// The key-to-digest mapping is stable across versions sharing a cache root;
// exposed so callers can locate or shard on entries themselves.
pub use hash::digest;
