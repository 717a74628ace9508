//! Stable content hashing of rendered payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Blake3 digest truncated to its first 8 bytes, read little-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub u64);

impl ContentHash {
    /// Hash the given bytes.
    pub fn of(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Self(u64::from_le_bytes(head))
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Convert to hex string (little-endian byte order, as hashed).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_le_bytes())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<u64> for ContentHash {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
