//! Symmetric key material.
//!
//! Two kinds of AES-256 keys flow through the envelope:
//! - one-time random keys that protect a request and are wrapped for the authority
//! - hardware-derived keys, `SHA256(hardware_id || salt)`, that bind a license
//!   to one machine without any key exchange

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of symmetric keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Fixed salt mixed into every hardware-derived key.
///
/// Shared by issuer and validator. Not a secret: the binding strength comes
/// from the hardware ID, not from this value.
pub const HARDWARE_KEY_SALT: &str = "_license_key_salt_2024";

/// A 256-bit symmetric key with automatic zeroization on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a key from a slice, checking its length.
    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: slice.len(),
                })?;
        Ok(Self { bytes })
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// SHA-256 of the key.
    ///
    /// Stored next to a license ciphertext so a validator can tell "wrong
    /// machine" apart from "corrupt data" without attempting decryption.
    pub fn key_check_digest(&self) -> [u8; 32] {
        Sha256::digest(self.bytes).into()
    }

    /// Lowercase hex form of [`key_check_digest`](Self::key_check_digest).
    pub fn key_check(&self) -> String {
        hex::encode(self.key_check_digest())
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generates a random key from the OS CSPRNG.
pub fn generate_random_key() -> SymmetricKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SymmetricKey::from_bytes(bytes)
}

/// Derives the license key for a machine from its hardware fingerprint.
///
/// Deterministic: the issuer and the licensed machine compute the same key
/// independently.
pub fn derive_hardware_key(hardware_id: &str) -> SymmetricKey {
    let mut hasher = Sha256::new();
    hasher.update(hardware_id.as_bytes());
    hasher.update(HARDWARE_KEY_SALT.as_bytes());
    SymmetricKey::from_bytes(hasher.finalize().into())
}
