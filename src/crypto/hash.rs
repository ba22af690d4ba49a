//! SHA-256 hashing for transaction headers and signing digests
//!
//! Provides the `Hash256` value type used for input references and inner
//! hashes, plus the paired digest each input signature is computed over.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Errors parsing hash values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 256-bit hash value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The all-zero hash
    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Check whether every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s).map_err(|_| HashError::InvalidHex(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// Hex encoding of the hash
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Computes SHA-256 of the input data
pub fn sha256(data: &[u8]) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash256(hasher.finalize().into())
}

/// Computes SHA-256 over the concatenation of two hashes.
///
/// The digest signed for input `i` is `add_sha256(inner_hash, inputs[i])`,
/// binding each signature to both the header and the specific spend.
pub fn add_sha256(a: &Hash256, b: &Hash256) -> Hash256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&a.0);
    buf[32..].copy_from_slice(&b.0);
    sha256(&buf)
}

/// Computes SHA-256 and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    sha256(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(
            hash.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_hex_round_trip() {
        let hash = sha256(b"round trip");
        let parsed = Hash256::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_hash_parse_errors() {
        assert!(matches!(
            Hash256::from_hex("zz"),
            Err(HashError::InvalidHex(_))
        ));
        assert!(matches!(
            Hash256::from_hex("abcd"),
            Err(HashError::InvalidLength(2))
        ));
    }

    #[test]
    fn test_zero_hash() {
        assert!(Hash256::zero().is_zero());
        assert!(!sha256(b"x").is_zero());
    }

    #[test]
    fn test_add_sha256_binds_both_sides() {
        let a = sha256(b"header");
        let b = sha256(b"input");
        let ab = add_sha256(&a, &b);
        let ba = add_sha256(&b, &a);
        assert_ne!(ab, ba);
        assert_ne!(ab, a);
        assert_ne!(ab, b);
    }

    #[test]
    fn test_hash_serde_as_hex() {
        let hash = sha256(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }
}
