//! Error types for the licensing module.

use crate::model::ModuleId;
use crate::validator::ValidationState;
use hwbind_crypto::CryptoError;
use std::path::PathBuf;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Token framing is wrong: too short, unknown prefix, or the other tag.
    #[error("invalid token format: {0}")]
    Format(String),

    /// Payload contains a character outside the base-58 alphabet.
    #[error("invalid token encoding: {0}")]
    Encoding(String),

    /// Payload did not decompress or deserialize.
    #[error("corrupt payload: {0}")]
    Corruption(String),

    /// AEAD authentication failed, or the request hash does not match.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// The wrapped request key could not be unwrapped.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The license was sealed for a different hardware-derived key.
    #[error("license key mismatch: hardware fingerprint changed")]
    KeyMismatch,

    /// The decrypted license names a different machine.
    #[error("hardware fingerprint mismatch: license is bound to {expected}, machine is {actual}")]
    HardwareMismatch { expected: String, actual: String },

    /// Current time is before the issue time.
    #[error("license not yet valid (issued {})", format_timestamp(*issued_at))]
    NotYetValid { issued_at: i64 },

    /// Current time is past the expiry time.
    #[error("license expired on {}", format_timestamp(*expires_at))]
    Expired { expires_at: i64 },

    /// The authority signature does not cover this license.
    #[error("invalid license signature")]
    BadSignature,

    /// The license is valid but does not grant this module.
    #[error("module '{0}' not authorized")]
    ModuleNotAuthorized(ModuleId),

    /// A caller-supplied argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No license file at the expected location.
    #[error("license file not found: {}", .0.display())]
    Missing(PathBuf),

    /// Key material or configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LicenseError {
    /// The validation state this error puts a license in.
    ///
    /// `ModuleNotAuthorized` is raised only after a license validated, so it
    /// maps to [`ValidationState::Valid`]. Every error that is not a binding,
    /// time, or signature failure reads as [`ValidationState::Corrupt`].
    #[must_use]
    pub fn state(&self) -> ValidationState {
        match self {
            Self::Missing(_) => ValidationState::Missing,
            Self::KeyMismatch => ValidationState::KeyMismatch,
            Self::HardwareMismatch { .. } => ValidationState::HardwareMismatch,
            Self::NotYetValid { .. } => ValidationState::NotYetValid,
            Self::Expired { .. } => ValidationState::Expired,
            Self::BadSignature => ValidationState::BadSignature,
            Self::ModuleNotAuthorized(_) => ValidationState::Valid,
            _ => ValidationState::Corrupt,
        }
    }
}

impl From<CryptoError> for LicenseError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Decryption(msg) => Self::Decryption(msg),
            CryptoError::Integrity(msg) => Self::Integrity(msg),
            CryptoError::InvalidKeyLength { expected, actual } => Self::Decryption(format!(
                "unwrapped key has {actual} bytes, expected {expected}"
            )),
            CryptoError::Serialization(e) => Self::Corruption(e.to_string()),
            CryptoError::InvalidKey(msg)
            | CryptoError::Encryption(msg)
            | CryptoError::Signing(msg) => Self::Config(msg),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Formats a Unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub(crate) fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
