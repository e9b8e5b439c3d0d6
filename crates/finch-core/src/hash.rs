//! Snapshot identity: content hashes and snapshot IDs.
//!
//! A check runs over an immutable declaration snapshot. Hashing the loaded
//! input gives a stable identifier that appears in JSON responses, so a
//! caller can correlate diagnostics with the exact input that produced them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash type for content verification (SHA-256, stored as hex string for
/// JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        ContentHash(hex::encode(result))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the exact snapshot a check ran against.
///
/// Derived from the sorted (path, content) pairs of the loaded input, so
/// the same input always produces the same ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub String);

impl SnapshotId {
    /// Create a new snapshot ID with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        SnapshotId(id.into())
    }

    /// Derive a snapshot ID from sorted (path, content) pairs.
    pub fn derive<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Self {
        let mut hasher = Sha256::new();
        for (path, content) in entries {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(content);
            hasher.update([0u8]);
        }
        let digest = hex::encode(hasher.finalize());
        SnapshotId(format!("snap_{}", &digest[..16]))
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_hex_sha256() {
        let hash = ContentHash::compute(b"hello");
        assert_eq!(hash.0.len(), 64);
        assert!(hash.0.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(ContentHash::compute(b"x"), ContentHash::compute(b"x"));
        assert_ne!(ContentHash::compute(b"x"), ContentHash::compute(b"y"));
    }

    #[test]
    fn snapshot_id_is_stable_and_prefixed() {
        let entries = [("a.json", b"{}".as_slice()), ("b.json", b"[]".as_slice())];
        let id = SnapshotId::derive(entries);
        let again = SnapshotId::derive(entries);
        assert_eq!(id, again);
        assert!(id.0.starts_with("snap_"));
        assert_eq!(id.0.len(), "snap_".len() + 16);
    }

    #[test]
    fn snapshot_id_depends_on_paths() {
        let a = SnapshotId::derive([("a.json", b"{}".as_slice())]);
        let b = SnapshotId::derive([("b.json", b"{}".as_slice())]);
        assert_ne!(a, b);
    }
}
