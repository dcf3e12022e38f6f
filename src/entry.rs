//! Cache entry record: the value plus its creation and expiration timestamps.
//!
//! Entries are written to disk as a single self-describing record and are
//! never partially updated; every write replaces the whole record.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{CacheError, CacheResult};

/// When an entry stops being served by `get`.
///
/// Modeled as a closed enumeration so perpetual and immediate expiration are
/// distinct cases rather than sentinel timestamps that could be compared
/// against ordinary ones by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiration {
    /// The entry never goes stale.
    Never,
    /// The entry is stale from the moment it is written.
    Now,
    /// The entry goes stale once the given instant has passed.
    At(SystemTime),
}

/// A single cache record as stored on disk.
///
/// The value is an opaque JSON graph; reading a record always deserializes a
/// fresh copy, so callers can never mutate the stored representation through
/// a returned value (or vice versa).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value graph.
    pub(crate) value: Value,

    /// When this entry was written.
    pub(crate) created_at: SystemTime,

    /// When this entry goes stale. Evaluated lazily at read time;
    /// staleness is never stored.
    pub(crate) expires_at: Expiration,
}

impl CacheEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(value: Value, expires_at: Expiration) -> Self {
        Self::with_creation_time(value, expires_at, SystemTime::now())
    }

    /// Create a new entry with an explicit creation time.
    pub fn with_creation_time(value: Value, expires_at: Expiration, created_at: SystemTime) -> Self {
        Self {
            value,
            created_at,
            expires_at,
        }
    }

    /// Check if this entry is stale.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(SystemTime::now())
    }

    /// Check if this entry is stale at a given time.
    /// This is useful for testing with a controlled clock, and for sweeps
    /// that must evaluate every entry against one snapshot of "now".
    pub fn is_stale_at(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Expiration::Never => false,
            Expiration::Now => true,
            Expiration::At(instant) => now >= instant,
        }
    }

    /// The instant this entry expires, if it expires at all.
    ///
    /// `Now` maps to the creation time so that born-stale entries order
    /// ahead of everything else during victim selection.
    pub fn expiration_instant(&self) -> Option<SystemTime> {
        match self.expires_at {
            Expiration::Never => None,
            Expiration::Now => Some(self.created_at),
            Expiration::At(instant) => Some(instant),
        }
    }

    /// Get a reference to the stored value graph.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get the creation time.
    pub fn creation_time(&self) -> SystemTime {
        self.created_at
    }

    /// Get the expiration.
    pub fn expiration(&self) -> Expiration {
        self.expires_at
    }

    /// Encode this record to its on-disk byte form.
    pub fn encode(&self) -> CacheResult<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|err| CacheError::InvalidValue(err.to_string()))
    }

    /// Decode a record read from `path`.
    ///
    /// A truncated or garbled record (e.g. from a writer that crashed
    /// mid-overwrite) yields `CorruptRecord`; every read path in the crate
    /// maps that to "entry absent" rather than failing.
    pub fn decode(bytes: &[u8], path: &Path) -> CacheResult<Self> {
        serde_json::from_slice(bytes).map_err(|err| CacheError::corrupt(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_never_not_stale() {
        let entry = CacheEntry::new(json!("test"), Expiration::Never);
        assert!(!entry.is_stale());
        assert_eq!(entry.expiration_instant(), None);
    }

    #[test]
    fn test_now_stale_from_birth() {
        let entry = CacheEntry::new(json!("test"), Expiration::Now);
        assert!(entry.is_stale());
        assert_eq!(entry.expiration_instant(), Some(entry.creation_time()));
    }

    #[test]
    fn test_future_expiration_fresh() {
        let future = SystemTime::now() + Duration::from_secs(60);
        let entry = CacheEntry::new(json!("test"), Expiration::At(future));
        assert!(!entry.is_stale());
    }

    #[test]
    fn test_past_expiration_stale() {
        let past = SystemTime::now() - Duration::from_secs(1);
        let entry = CacheEntry::new(json!("test"), Expiration::At(past));
        assert!(entry.is_stale());
    }

    #[test]
    fn test_stale_at_controlled_clock() {
        let t0 = SystemTime::now();
        let entry =
            CacheEntry::with_creation_time(json!(1), Expiration::At(t0 + Duration::from_secs(10)), t0);

        assert!(!entry.is_stale_at(t0 + Duration::from_secs(9)));
        assert!(entry.is_stale_at(t0 + Duration::from_secs(10)));
        assert!(entry.is_stale_at(t0 + Duration::from_secs(11)));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let value = json!({
            "user": "alice",
            "roles": ["admin", "ops"],
            "nested": { "depth": 2 }
        });
        let entry = CacheEntry::new(value.clone(), Expiration::Never);

        let bytes = entry.encode().unwrap();
        let decoded = CacheEntry::decode(&bytes, Path::new("test-record")).unwrap();

        assert_eq!(decoded.value(), &value);
        assert_eq!(decoded.creation_time(), entry.creation_time());
        assert_eq!(decoded.expiration(), Expiration::Never);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = CacheEntry::decode(b"not a record", Path::new("bad"));
        assert!(matches!(result, Err(CacheError::CorruptRecord { .. })));
    }

    #[test]
    fn test_decode_rejects_truncated_record() {
        let entry = CacheEntry::new(json!([1, 2, 3]), Expiration::Never);
        let bytes = entry.encode().unwrap();

        let truncated = &bytes[..bytes.len() / 2];
        assert!(CacheEntry::decode(truncated, Path::new("bad")).is_err());
    }
}
