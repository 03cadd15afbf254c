//! Shared test helpers for license tests.

#![allow(dead_code)]

use hwbind_crypto::{derive_hardware_key, encrypt_record, AuthorityKeyPair, AuthorityPublicKey};
use hwbind_license::codec::{self, Tag};
use hwbind_license::{
    IssueOptions, License, LicenseEdition, LicenseEnvelope, LicenseIssuer, LicenseValidator,
    RequestBuilder, FORMAT_VERSION,
};
use serde::Serialize;

pub const AUTHORITY_PRIVATE_PEM: &str = include_str!("../../../testdata/authority_private.pem");
pub const AUTHORITY_PUBLIC_PEM: &str = include_str!("../../../testdata/authority_public.pem");
pub const FOREIGN_PRIVATE_PEM: &str = include_str!("../../../testdata/foreign_private.pem");
pub const FOREIGN_PUBLIC_PEM: &str = include_str!("../../../testdata/foreign_public.pem");

/// Fixed clock for deterministic tests (2023-11-14 22:13:20 UTC).
pub const NOW: i64 = 1_700_000_000;

pub const DAY: i64 = 86_400;

pub fn authority() -> AuthorityKeyPair {
    AuthorityKeyPair::from_pem(AUTHORITY_PRIVATE_PEM).unwrap()
}

pub fn authority_public() -> AuthorityPublicKey {
    AuthorityPublicKey::from_pem(AUTHORITY_PUBLIC_PEM).unwrap()
}

pub fn foreign_authority() -> AuthorityKeyPair {
    AuthorityKeyPair::from_pem(FOREIGN_PRIVATE_PEM).unwrap()
}

pub fn issuer() -> LicenseIssuer {
    LicenseIssuer::new(authority())
}

pub fn validator() -> LicenseValidator {
    LicenseValidator::new(authority_public())
}

/// A `"REQ:"` token for `hardware_id`, sealed for the fixture authority.
pub fn request_token(hardware_id: &str) -> String {
    let authority = authority_public();
    RequestBuilder::new(&authority, hardware_id)
        .machine_info("test-host (linux 6.1, x86_64)")
        .build()
        .unwrap()
}

pub fn options(edition: LicenseEdition, days: i64) -> IssueOptions {
    IssueOptions {
        days,
        edition,
        ..IssueOptions::default()
    }
}

/// Requests and issues a license for `hardware_id` at [`NOW`].
pub fn issue_for(hardware_id: &str, edition: LicenseEdition, days: i64) -> String {
    issuer()
        .issue_at(&request_token(hardware_id), &options(edition, days), NOW)
        .unwrap()
}

/// An enterprise license for `hardware_id` with an explicit time window.
pub fn license_with_window(hardware_id: &str, issued_at: i64, expires_at: i64) -> License {
    let edition = LicenseEdition::Enterprise;
    License {
        hardware_id: hardware_id.to_string(),
        issued_at,
        expires_at,
        edition: Some(edition),
        modules: edition.modules(),
        module_perms: edition.module_permissions(),
        customer_id: hwbind_license::customer_id(hardware_id),
        customer_name: "Test Customer".to_string(),
        customer_org: "Test Org".to_string(),
        max_scans: edition.max_scans(),
        max_assets: edition.max_assets(),
        max_users: edition.max_users(),
        features: edition.features(),
        request_id: "00112233445566778899aabbccddeeff".to_string(),
        license_key: hwbind_license::license_key(hardware_id, edition),
        serial_number: hwbind_license::serial_number(hardware_id, edition),
    }
}

/// Signs `license` with `signer` and encrypts it for `sealed_for`,
/// regardless of the hardware ID inside the license. Any serializable shape
/// works, so older license layouts can be sealed as-is.
pub fn seal_manually<T: Serialize>(
    license: &T,
    signer: &AuthorityKeyPair,
    sealed_for: &str,
) -> String {
    let key = derive_hardware_key(sealed_for);
    let envelope = LicenseEnvelope {
        cipher_data: encrypt_record(&key, license).unwrap(),
        key_check: key.key_check_digest().to_vec(),
        signature: signer.sign_record(license).unwrap(),
        format_version: FORMAT_VERSION.to_string(),
    };
    codec::encode(&envelope, Tag::License).unwrap()
}

/// Decodes a license token, applies `edit` to its envelope, and re-encodes.
pub fn edit_envelope(token: &str, edit: impl FnOnce(&mut LicenseEnvelope)) -> String {
    let mut envelope: LicenseEnvelope = codec::decode_as(token, Tag::License).unwrap();
    edit(&mut envelope);
    codec::encode(&envelope, Tag::License).unwrap()
}
