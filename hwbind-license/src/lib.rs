//! Machine-bound licensing for hwbind.
//!
//! This crate handles:
//! - Building license requests sealed for the license authority
//! - Issuing licenses bound to the requesting machine's fingerprint
//! - Validating licenses and answering module-permission queries
//! - Hardware fingerprinting
//!
//! # Protocol
//!
//! 1. The client builds a [`Request`] with its hardware fingerprint, encrypts
//!    it under a one-time AES key, wraps that key with the authority's RSA
//!    public key, and encodes the result as a `"REQ:"` token.
//! 2. The authority opens the request, builds a [`License`] from the
//!    requested edition, signs it, encrypts it under a key derived from the
//!    fingerprint, and encodes the result as a `"LIC:"` token.
//! 3. The client re-derives the key from its own fingerprint, decrypts the
//!    license, and checks binding, time window, and signature.
//!
//! # Token Format
//!
//! `PREFIX || base58(gzip(JSON(envelope)))`, see [`codec`].

pub mod base58;
pub mod codec;
mod config;
mod edition;
mod entitlements;
mod error;
mod hardware;
mod issuer;
mod model;
mod request;
mod validator;

pub use codec::Tag;
pub use config::{HwbindConfig, KeySource};
pub use edition::LicenseEdition;
pub use entitlements::Entitlements;
pub use error::{LicenseError, LicenseResult};
pub use hardware::{FingerprintProvider, MachineInfo, StaticFingerprint, SystemFingerprint};
pub use issuer::{customer_id, license_key, serial_number, CustomerInfo, IssueOptions, LicenseIssuer};
pub use model::{
    License, LicenseEnvelope, ModuleId, ModulePermission, Quota, Request, RequestEnvelope,
};
pub use request::{RequestBuilder, DEFAULT_APP_VERSION};
pub use validator::{LicenseValidator, ValidatedLicense, ValidationState};

/// Format version written into every license envelope.
pub const FORMAT_VERSION: &str = "2.0";

/// Seconds per day, the unit of license validity.
pub const SECS_PER_DAY: i64 = 86_400;
