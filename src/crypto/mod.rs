//! Cryptographic utilities for the wallet engine
//!
//! This module provides:
//! - SHA-256 hashing and the `Hash256` value type
//! - Recoverable ECDSA key management (secp256k1)
//! - Deterministic key derivation from seed material

pub mod hash;
pub mod keys;

pub use hash::{add_sha256, sha256, sha256_hex, Hash256, HashError};
pub use keys::{
    public_key_from_hex, public_key_to_address, recover_pubkey, sign_hash,
    verify_address_signed_hash, KeyDeriver, KeyError, KeyPair, Sha256KeyDeriver, Signature,
};
