//! Cryptographic primitives for the hwbind license envelope.
//!
//! This crate provides:
//! - AES-256-GCM record encryption with a random 96-bit nonce prefix
//! - RSA-OAEP(SHA-256) key wrapping and RSA PKCS#1 v1.5 signatures
//! - Hybrid sealing of records for the license authority
//! - The hardware-derived key scheme used to bind licenses to machines
//! - Canonical record serialization for hashing and signing

mod authority;
mod canonical;
mod cipher;
mod error;
mod hybrid;
mod key;

pub use authority::{AuthorityKeyPair, AuthorityPublicKey};
pub use canonical::{hash_record, sha256_str, to_canonical_bytes, DIGEST_SIZE};
pub use cipher::{
    decrypt, decrypt_bytes, decrypt_record, encrypt, encrypt_record, EncryptedData, NONCE_SIZE,
    TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use hybrid::{open_record, seal_record, SealedRecord};
pub use key::{
    derive_hardware_key, generate_random_key, SymmetricKey, HARDWARE_KEY_SALT, KEY_SIZE,
};
