//! Canonical serialization and record hashing.
//!
//! Everything that is hashed, signed, or encrypted goes through
//! [`to_canonical_bytes`]: compact JSON, fields in declaration order, every
//! field emitted (optional values as `null`). Records that take part in the
//! envelope must not use `skip_serializing_if`, or signer and verifier can
//! disagree on the bytes.

use crate::error::CryptoResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Size of a record digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Serializes a record to its canonical byte form.
pub fn to_canonical_bytes<T: Serialize>(record: &T) -> CryptoResult<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

/// SHA-256 over the canonical serialization of a record.
pub fn hash_record<T: Serialize>(record: &T) -> CryptoResult<[u8; DIGEST_SIZE]> {
    let bytes = to_canonical_bytes(record)?;
    Ok(Sha256::digest(&bytes).into())
}

/// SHA-256 of a UTF-8 string, used for the deterministic license identifiers.
pub fn sha256_str(input: &str) -> [u8; DIGEST_SIZE] {
    Sha256::digest(input.as_bytes()).into()
}
