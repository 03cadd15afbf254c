//! Hybrid encryption of records for the authority.
//!
//! Two-tier key architecture:
//!
//! 1. Record key: random AES-256 key per record
//! 2. Wrapped key: the record key, encrypted with the authority's RSA key
//!
//! Only the holder of the authority private key can recover the record key,
//! and RSA is never applied to bulk data.

use crate::authority::{AuthorityKeyPair, AuthorityPublicKey};
use crate::cipher;
use crate::error::CryptoResult;
use crate::key::generate_random_key;
use serde::{de::DeserializeOwned, Serialize};

/// A record sealed for the authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedRecord {
    /// `nonce || ciphertext` of the canonical record bytes.
    pub ciphertext: Vec<u8>,
    /// The record key, RSA-OAEP encrypted.
    pub wrapped_key: Vec<u8>,
}

/// Seals a record so that only the authority can open it.
///
/// # Process
/// 1. Generate a random record key
/// 2. Encrypt the record with the record key
/// 3. Wrap the record key with the authority public key
pub fn seal_record<T: Serialize>(
    record: &T,
    authority: &AuthorityPublicKey,
) -> CryptoResult<SealedRecord> {
    let record_key = generate_random_key();

    let ciphertext = cipher::encrypt_record(&record_key, record)?;
    let wrapped_key = authority.wrap_key(&record_key)?;

    Ok(SealedRecord {
        ciphertext,
        wrapped_key,
    })
}

/// Opens a record sealed with [`seal_record`].
pub fn open_record<T: DeserializeOwned>(
    sealed: &SealedRecord,
    authority: &AuthorityKeyPair,
) -> CryptoResult<T> {
    let record_key = authority.unwrap_key(&sealed.wrapped_key)?;
    cipher::decrypt_record(&record_key, &sealed.ciphertext)
}
