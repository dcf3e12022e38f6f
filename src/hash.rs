//! Identifier hashing: key string to fixed-length hex digest.
//!
//! The digest names the entry file and drives shard-directory selection, so
//! it must be identical across processes and platforms sharing a cache root.
//! It only needs to spread files evenly; adversarial collision resistance is
//! out of scope.

use crate::error::{CacheError, CacheResult};

/// Length of a digest in hex characters.
pub(crate) const DIGEST_LEN: usize = 32;

/// Hash a key to its 32-character lowercase hex digest.
///
/// Fails with `InvalidKey` on an empty key.
pub fn digest(key: &str) -> CacheResult<String> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(format!("{:x}", md5::compute(key.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_digest() {
        // Fixed vector; any change here would orphan every existing cache file.
        assert_eq!(
            digest("Hello World").unwrap(),
            "b10a8db164e0754105b7a99be72e3fe5"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(digest(""), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(digest("key1").unwrap(), digest("key1").unwrap());
        assert_ne!(digest("key1").unwrap(), digest("key2").unwrap());
    }

    proptest! {
        #[test]
        fn test_digest_shape(key in ".+") {
            let d = digest(&key).unwrap();
            prop_assert_eq!(d.len(), DIGEST_LEN);
            prop_assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn test_digest_stable(key in ".+") {
            prop_assert_eq!(digest(&key).unwrap(), digest(&key).unwrap());
        }
    }
}
