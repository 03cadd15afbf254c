//! Error types for the envelope crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Asymmetric unwrap failed (wrong key pair or corrupted padding).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// AEAD authentication failed or the ciphertext is truncated.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Key material could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
