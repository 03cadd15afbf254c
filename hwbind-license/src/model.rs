//! Request and license records, and their envelopes.
//!
//! Field order is part of the wire contract: records are hashed, signed and
//! encrypted over their canonical JSON, which follows declaration order.
//! Do not reorder fields and do not add `skip_serializing_if`.

use crate::edition::LicenseEdition;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a licensable feature area.
///
/// Unknown IDs are preserved so licenses naming newer modules still decode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Network admission control.
    pub const ADMISSION: &'static str = "admission";
    /// Vulnerability scanning.
    pub const VULNERABILITY_SCAN: &'static str = "vulnerability_scan";
    /// Weak password auditing.
    pub const PASSWORD_AUDIT: &'static str = "password_audit";
    /// Camera discovery and scanning.
    pub const CAMERA_SCAN: &'static str = "camera_scan";

    /// Creates a module ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every module this build knows about, in display order.
    #[must_use]
    pub fn known() -> Vec<Self> {
        [
            Self::ADMISSION,
            Self::VULNERABILITY_SCAN,
            Self::PASSWORD_AUDIT,
            Self::CAMERA_SCAN,
        ]
        .into_iter()
        .map(Self::new)
        .collect()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for ModuleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A usage limit. Zero means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quota(pub u32);

impl Quota {
    /// No limit.
    pub const UNLIMITED: Self = Self(0);

    /// Returns the limit, or `None` when unlimited.
    #[must_use]
    pub fn limit(self) -> Option<u32> {
        (self.0 != 0).then_some(self.0)
    }

    /// Returns true when there is no limit.
    #[must_use]
    pub fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit() {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unlimited"),
        }
    }
}

/// A license request, produced once per machine per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Hardware fingerprint of the requesting machine.
    pub hardware_id: String,
    /// Creation time (seconds since epoch).
    pub timestamp: i64,
    /// Version of the requesting application.
    pub version: String,
    /// Human-readable machine description.
    pub machine_info: String,
    /// 128-bit random ID, 32 lowercase hex characters.
    pub request_id: String,
}

/// The request artifact: an encrypted [`Request`] only the authority can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// `nonce || ciphertext` of the request under a one-time key.
    #[serde(rename = "data", with = "base64_bytes")]
    pub cipher_data: Vec<u8>,
    /// The one-time key, RSA-OAEP wrapped for the authority.
    #[serde(rename = "key", with = "base64_bytes")]
    pub wrapped_key: Vec<u8>,
    /// SHA-256 of the canonical request.
    #[serde(rename = "hash", with = "hex::serde")]
    pub integrity_hash: Vec<u8>,
    /// Envelope creation time (seconds since epoch).
    pub timestamp: i64,
}

/// Authorization record for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    pub module: ModuleId,
    pub enabled: bool,
    pub max_scans: Quota,
    pub max_targets: Quota,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: BTreeSet<String>,
}

/// The license terms, signed by the authority.
///
/// `issued_at <= expires_at`. When `module_perms` is non-empty it is
/// authoritative; otherwise the legacy `modules` list is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub hardware_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
    #[serde(default, deserialize_with = "edition_or_empty")]
    pub edition: Option<LicenseEdition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<ModuleId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub module_perms: Vec<ModulePermission>,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_org: String,
    pub max_scans: Quota,
    #[serde(default)]
    pub max_assets: Quota,
    #[serde(default)]
    pub max_users: Quota,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<String>,
    pub request_id: String,
    #[serde(default)]
    pub license_key: String,
    #[serde(default)]
    pub serial_number: String,
}

impl License {
    /// Whole days until expiry, negative once expired.
    #[must_use]
    pub fn remaining_days(&self, now: i64) -> i64 {
        (self.expires_at - now) / crate::SECS_PER_DAY
    }
}

/// The license artifact: a [`License`] only the bound machine can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseEnvelope {
    /// `nonce || ciphertext` of the license under the hardware-derived key.
    #[serde(rename = "data", with = "base64_bytes")]
    pub cipher_data: Vec<u8>,
    /// SHA-256 of the hardware-derived key.
    #[serde(rename = "key", with = "hex::serde")]
    pub key_check: Vec<u8>,
    /// PKCS#1 v1.5 signature over the canonical license.
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
    #[serde(rename = "version")]
    pub format_version: String,
}

/// Standard-alphabet base-64 for byte fields.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// Reads `null` as the default value (nil slices from older issuers).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads `null` or `""` as no edition.
fn edition_or_empty<'de, D>(deserializer: D) -> Result<Option<LicenseEdition>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
