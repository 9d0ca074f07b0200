//! Content hashing for asset deduplication.
//!
//! Every asset is keyed by the SHA-256 of its bytes, so identical files
//! emitted under different paths collapse onto one entry and the remote can
//! be asked which hashes it already stores.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A full 64-character SHA-256 hash of some content.
///
/// # Format
///
/// Lowercase hexadecimal, e.g. `"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for ContentHash {
  fn from(value: &str) -> Self {
    ContentHash(value.to_string())
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Hash an ordered sequence of hashes into one digest.
///
/// Used for the build hash: the caller supplies hashes in a stable order.
pub fn hash_hashes<'a, I>(hashes: I) -> ContentHash
where
  I: IntoIterator<Item = &'a ContentHash>,
{
  let mut hasher = Sha256::new();
  for hash in hashes {
    hasher.update(hash.0.as_bytes());
    hasher.update(b"\n");
  }
  ContentHash(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_bytes_is_sha256_hex() {
    let hash = hash_bytes(b"hello");
    assert_eq!(hash.0, "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824");
    assert_eq!(hash.as_str().len(), 64);
  }

  #[test]
  fn identical_content_same_hash() {
    assert_eq!(hash_bytes(b"console.log(1)"), hash_bytes(b"console.log(1)"));
    assert_ne!(hash_bytes(b"console.log(1)"), hash_bytes(b"console.log(2)"));
  }

  #[test]
  fn hash_of_hashes_depends_on_order() {
    let a = hash_bytes(b"a");
    let b = hash_bytes(b"b");
    assert_eq!(hash_hashes([&a, &b]), hash_hashes([&a, &b]));
    assert_ne!(hash_hashes([&a, &b]), hash_hashes([&b, &a]));
  }

  #[test]
  fn serializes_as_plain_string() {
    let hash = ContentHash::from("abc");
    assert_eq!(serde_json::to_string(&hash).unwrap(), "\"abc\"");
  }
}
