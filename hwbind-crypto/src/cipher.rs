//! Record encryption using AES-256-GCM.
//!
//! Wire layout is `nonce || ciphertext || tag`, with a fresh random 96-bit
//! nonce per encryption.

use crate::canonical::to_canonical_bytes;
use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};

/// Size of nonce in bytes (96 bits for AES-GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypted data with the nonce needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the encrypted data.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Flattens to `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Splits a `nonce || ciphertext` buffer.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE {
            return Err(CryptoError::Integrity(format!(
                "ciphertext too short: {} bytes",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        let ciphertext = bytes[NONCE_SIZE..].to_vec();

        Ok(Self { nonce, ciphertext })
    }
}

/// Encrypts plaintext using AES-256-GCM.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts and authenticates ciphertext using AES-256-GCM.
pub fn decrypt(key: &SymmetricKey, encrypted: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&encrypted.nonce);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Integrity("authentication failed (wrong key or tampered data)".to_string())
        })
}

/// Canonically serializes a record and encrypts it, returning `nonce || ciphertext`.
pub fn encrypt_record<T: Serialize>(key: &SymmetricKey, record: &T) -> CryptoResult<Vec<u8>> {
    let plaintext = to_canonical_bytes(record)?;
    Ok(encrypt(key, &plaintext)?.to_bytes())
}

/// Decrypts a `nonce || ciphertext` buffer to the plaintext bytes.
pub fn decrypt_bytes(key: &SymmetricKey, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    decrypt(key, &EncryptedData::from_bytes(bytes)?)
}

/// Inverse of [`encrypt_record`].
///
/// A plaintext that authenticates but does not parse as `T` is reported as
/// [`CryptoError::Serialization`].
pub fn decrypt_record<T: DeserializeOwned>(key: &SymmetricKey, bytes: &[u8]) -> CryptoResult<T> {
    Ok(serde_json::from_slice(&decrypt_bytes(key, bytes)?)?)
}
