//! License validation.
//!
//! Every check is evaluated fresh from the token; nothing about a previous
//! successful validation is cached. Checks run in a fixed order and the
//! first failure decides the state:
//!
//! 1. token framing and payload (`Corrupt`)
//! 2. key check against the derived hardware key (`KeyMismatch`)
//! 3. AEAD decryption (`Corrupt`)
//! 4. hardware ID inside the license (`HardwareMismatch`)
//! 5. time window (`NotYetValid`, `Expired`)
//! 6. authority signature (`BadSignature`)

use crate::codec::{self, Tag};
use crate::edition::LicenseEdition;
use crate::entitlements::Entitlements;
use crate::error::{LicenseError, LicenseResult};
use crate::model::{License, LicenseEnvelope, ModuleId, ModulePermission};
use crate::FORMAT_VERSION;
use hwbind_crypto::{decrypt_bytes, derive_hardware_key, AuthorityPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of validating one license artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// No license artifact.
    Missing,
    /// Sealed for a different machine.
    KeyMismatch,
    /// Malformed, undecryptable, or unreadable.
    Corrupt,
    /// Decrypted, but names a different machine.
    HardwareMismatch,
    /// Issued in the future.
    NotYetValid,
    /// Past its expiry time.
    Expired,
    /// Not signed by the authority.
    BadSignature,
    /// Every check passed.
    Valid,
}

impl ValidationState {
    /// Classifies a validation outcome.
    #[must_use]
    pub fn from_result<T>(result: &LicenseResult<T>) -> Self {
        match result {
            Ok(_) => Self::Valid,
            Err(e) => e.state(),
        }
    }

    /// Returns true for [`ValidationState::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns true when a license exists but cannot be used on this machine.
    #[must_use]
    pub fn is_invalid_present(&self) -> bool {
        !matches!(self, Self::Valid | Self::Missing)
    }

    /// Short human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Missing => "license file not found",
            Self::KeyMismatch => "license key mismatch (hardware fingerprint changed)",
            Self::Corrupt => "license file is corrupt",
            Self::HardwareMismatch => "license is bound to another machine",
            Self::NotYetValid => "license is not yet valid",
            Self::Expired => "license has expired",
            Self::BadSignature => "license signature is invalid",
            Self::Valid => "license is valid",
        }
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A license that passed every check.
///
/// Only obtainable from [`LicenseValidator`], so holding one means the
/// license is genuine, bound to this machine, and inside its time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLicense {
    license: License,
    entitlements: Entitlements,
    edition: LicenseEdition,
}

impl ValidatedLicense {
    fn new(license: License) -> Self {
        let entitlements = Entitlements::resolve(&license);
        let edition = entitlements.edition_of(&license);
        Self {
            license,
            entitlements,
            edition,
        }
    }

    /// The license terms.
    #[must_use]
    pub fn license(&self) -> &License {
        &self.license
    }

    /// Consumes the wrapper, returning the license terms.
    #[must_use]
    pub fn into_license(self) -> License {
        self.license
    }

    /// The resolved module permissions.
    #[must_use]
    pub fn entitlements(&self) -> &Entitlements {
        &self.entitlements
    }

    /// The explicit edition, or the one inferred from the module count.
    #[must_use]
    pub fn edition(&self) -> LicenseEdition {
        self.edition
    }

    /// Returns true if `module` is authorized.
    #[must_use]
    pub fn check_module(&self, module: &str) -> bool {
        self.entitlements.is_authorized(module)
    }

    /// Fails with [`LicenseError::ModuleNotAuthorized`] unless `module` is
    /// authorized.
    pub fn require_module(&self, module: &str) -> LicenseResult<()> {
        if self.check_module(module) {
            Ok(())
        } else {
            Err(LicenseError::ModuleNotAuthorized(ModuleId::new(module)))
        }
    }

    /// The detailed record for `module`, when the license carries one.
    #[must_use]
    pub fn module_permission(&self, module: &str) -> Option<&ModulePermission> {
        self.entitlements.permission(module)
    }

    /// Whole days until expiry as of `now`.
    #[must_use]
    pub fn remaining_days(&self, now: i64) -> i64 {
        self.license.remaining_days(now)
    }
}

/// Validates licenses against the authority public key.
#[derive(Debug, Clone)]
pub struct LicenseValidator {
    authority: AuthorityPublicKey,
}

impl LicenseValidator {
    /// Creates a validator trusting `authority`.
    pub fn new(authority: AuthorityPublicKey) -> Self {
        Self { authority }
    }

    /// Validates a `"LIC:"` token for this machine at the current time.
    pub fn validate(&self, token: &str, fingerprint: &str) -> LicenseResult<ValidatedLicense> {
        self.validate_at(token, fingerprint, chrono::Utc::now().timestamp())
    }

    /// Validates a `"LIC:"` token for this machine as of `now`.
    ///
    /// # Errors
    ///
    /// The first failing check, see the module docs. Time errors carry the
    /// violating timestamp.
    pub fn validate_at(
        &self,
        token: &str,
        fingerprint: &str,
        now: i64,
    ) -> LicenseResult<ValidatedLicense> {
        let envelope: LicenseEnvelope = codec::decode_as(token, Tag::License)?;
        if envelope.format_version != FORMAT_VERSION {
            warn!(
                version = %envelope.format_version,
                expected = FORMAT_VERSION,
                "unknown license format version"
            );
        }

        let key = derive_hardware_key(fingerprint);
        if envelope.key_check.as_slice() != key.key_check_digest().as_slice() {
            debug!("key check does not match this machine");
            return Err(LicenseError::KeyMismatch);
        }

        // The signature covers these bytes, not a re-serialization of them.
        let plaintext = decrypt_bytes(&key, &envelope.cipher_data)?;
        let license: License = serde_json::from_slice(&plaintext)
            .map_err(|e| LicenseError::Corruption(format!("invalid license record: {e}")))?;
        debug!(request_id = %license.request_id, "decrypted license");

        if license.hardware_id != fingerprint {
            return Err(LicenseError::HardwareMismatch {
                expected: license.hardware_id,
                actual: fingerprint.to_string(),
            });
        }

        if now < license.issued_at {
            return Err(LicenseError::NotYetValid {
                issued_at: license.issued_at,
            });
        }
        if now > license.expires_at {
            return Err(LicenseError::Expired {
                expires_at: license.expires_at,
            });
        }

        if !self.authority.verify_bytes(&plaintext, &envelope.signature) {
            return Err(LicenseError::BadSignature);
        }

        debug!(
            request_id = %license.request_id,
            expires_at = license.expires_at,
            "license valid"
        );
        Ok(ValidatedLicense::new(license))
    }

    /// Reads and validates a license file at the current time.
    pub fn validate_file(
        &self,
        path: impl AsRef<Path>,
        fingerprint: &str,
    ) -> LicenseResult<ValidatedLicense> {
        self.validate_file_at(path, fingerprint, chrono::Utc::now().timestamp())
    }

    /// Reads and validates a license file as of `now`.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Missing`] if the file does not exist, otherwise as
    /// [`validate_at`](Self::validate_at).
    pub fn validate_file_at(
        &self,
        path: impl AsRef<Path>,
        fingerprint: &str,
        now: i64,
    ) -> LicenseResult<ValidatedLicense> {
        let path = path.as_ref();
        let token = match std::fs::read_to_string(path) {
            Ok(token) => token,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LicenseError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        self.validate_at(&token, fingerprint, now)
    }

    /// Validates a token and requires one module.
    pub fn check_module(
        &self,
        token: &str,
        fingerprint: &str,
        module: &str,
    ) -> LicenseResult<ValidatedLicense> {
        let validated = self.validate(token, fingerprint)?;
        validated.require_module(module)?;
        Ok(validated)
    }
}
