mod common;

use common::{
    authority_public, foreign_authority, issue_for, issuer, license_with_window, options,
    request_token, validator, DAY, NOW,
};
use hwbind_license::codec::{self, Tag};
use hwbind_license::{
    customer_id, license_key, serial_number, CustomerInfo, IssueOptions, LicenseEdition,
    LicenseEnvelope, LicenseError, LicenseIssuer, ModuleId, Quota, RequestBuilder,
    RequestEnvelope, FORMAT_VERSION,
};
use pretty_assertions::assert_eq;

// ── Scenario ─────────────────────────────────────────────────────

#[test]
fn enterprise_thirty_day_scenario() {
    let request = request_token("abc123");
    let opts = options(LicenseEdition::Enterprise, 30);

    let license = issuer().build_license(&request, &opts, NOW).unwrap();
    assert_eq!(license.modules, ModuleId::known());
    assert_eq!(license.module_perms.len(), 4);
    assert_eq!(license.max_scans, Quota::UNLIMITED);
    assert_eq!(license.expires_at - license.issued_at, 30 * 86_400);
    assert_eq!(license.edition, Some(LicenseEdition::Enterprise));

    let token = issuer().issue_at(&request, &opts, NOW).unwrap();
    assert!(token.starts_with("LIC:"));

    assert!(validator().validate_at(&token, "abc123", NOW).is_ok());
    let wrong = validator().validate_at(&token, "xyz999", NOW).unwrap_err();
    assert!(matches!(
        wrong,
        LicenseError::KeyMismatch | LicenseError::HardwareMismatch { .. }
    ));
}

// ── Edition terms ────────────────────────────────────────────────

#[test]
fn basic_edition_terms() {
    let license = issuer()
        .build_license(&request_token("abc123"), &options(LicenseEdition::Basic, 30), NOW)
        .unwrap();
    assert_eq!(license.modules, vec![ModuleId::from("admission")]);
    assert_eq!(license.module_perms.len(), 1);
    assert_eq!(license.max_scans, Quota(1000));
    assert_eq!(license.max_assets, Quota(500));
    assert_eq!(license.max_users, Quota(3));
    assert_eq!(
        license.features,
        vec!["basic_scanning", "device_management", "basic_reporting"]
    );
    assert!(license.serial_number.starts_with("NSB-"));
}

#[test]
fn enterprise_module_permissions() {
    let license = issuer()
        .build_license(&request_token("abc123"), &options(LicenseEdition::Enterprise, 30), NOW)
        .unwrap();
    for perm in &license.module_perms {
        assert!(perm.enabled);
        assert!(perm.max_scans.is_unlimited());
        assert!(perm.max_targets.is_unlimited());
        assert!(perm.permissions.contains("execute"));
        assert!(!perm.features.is_empty());
    }
    let scan = license
        .module_perms
        .iter()
        .find(|p| p.module == *"vulnerability_scan")
        .unwrap();
    assert!(scan.features.contains("port_scan"));
    assert!(license.serial_number.starts_with("NSE-"));
}

#[test]
fn customer_and_request_are_carried() {
    let authority = authority_public();
    let envelope = RequestBuilder::new(&authority, "abc123")
        .build_envelope()
        .unwrap();
    let request = codec::encode(&envelope, Tag::Request).unwrap();
    let opened = issuer().open_request(&request).unwrap();

    let opts = IssueOptions {
        days: 10,
        customer: CustomerInfo {
            name: "Zhang San".into(),
            org: "ABC Corp".into(),
        },
        edition: LicenseEdition::Enterprise,
    };
    let license = issuer().build_license(&request, &opts, NOW).unwrap();
    assert_eq!(license.customer_name, "Zhang San");
    assert_eq!(license.customer_org, "ABC Corp");
    assert_eq!(license.request_id, opened.request_id);
    assert_eq!(license.issued_at, NOW);
}

// ── Identifiers ──────────────────────────────────────────────────

#[test]
fn identifiers_are_deterministic() {
    let license = issuer()
        .build_license(&request_token("abc123"), &options(LicenseEdition::Enterprise, 30), NOW)
        .unwrap();
    assert_eq!(license.customer_id, customer_id("abc123"));
    assert_eq!(license.license_key, license_key("abc123", LicenseEdition::Enterprise));
    assert_eq!(
        license.serial_number,
        serial_number("abc123", LicenseEdition::Enterprise)
    );
}

#[test]
fn identifier_shapes() {
    assert_eq!(customer_id("abc123").len(), 16);
    assert_eq!(license_key("abc123", LicenseEdition::Basic).len(), 32);

    let serial = serial_number("abc123", LicenseEdition::Basic);
    let (prefix, digest) = serial.split_once('-').unwrap();
    assert_eq!(prefix, "NSB");
    assert_eq!(digest.len(), 12);
}

#[test]
fn identifiers_depend_on_edition_and_machine() {
    assert_ne!(
        license_key("abc123", LicenseEdition::Basic),
        license_key("abc123", LicenseEdition::Enterprise)
    );
    assert_ne!(customer_id("abc123"), customer_id("xyz999"));
    let basic = serial_number("abc123", LicenseEdition::Basic);
    let enterprise = serial_number("abc123", LicenseEdition::Enterprise);
    assert_ne!(basic[4..], enterprise[4..]);
}

// ── Envelope ─────────────────────────────────────────────────────

#[test]
fn license_envelope_fields() {
    let token = issue_for("abc123", LicenseEdition::Enterprise, 30);
    let envelope: LicenseEnvelope = codec::decode_as(&token, Tag::License).unwrap();
    assert_eq!(envelope.format_version, FORMAT_VERSION);
    assert_eq!(
        envelope.key_check,
        hwbind_crypto::derive_hardware_key("abc123")
            .key_check_digest()
            .to_vec()
    );
    assert_eq!(envelope.signature.len(), 256);
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn non_positive_days_rejected() {
    let request = request_token("abc123");
    for days in [0, -1, -365] {
        let result = issuer().issue_at(&request, &options(LicenseEdition::Basic, days), NOW);
        assert!(matches!(result, Err(LicenseError::InvalidArgument(_))), "days = {days}");
    }
}

#[test]
fn overflowing_days_rejected() {
    let result = issuer().issue_at(
        &request_token("abc123"),
        &options(LicenseEdition::Basic, i64::MAX / 2),
        NOW,
    );
    assert!(matches!(result, Err(LicenseError::InvalidArgument(_))));
}

#[test]
fn license_token_is_not_a_request() {
    let license = issue_for("abc123", LicenseEdition::Basic, 30);
    let result = issuer().issue_at(&license, &options(LicenseEdition::Basic, 30), NOW);
    assert!(matches!(result, Err(LicenseError::Format(_))));
}

#[test]
fn request_for_other_authority_fails_decryption() {
    let other = LicenseIssuer::new(foreign_authority());
    let result = other.issue_at(
        &request_token("abc123"),
        &options(LicenseEdition::Basic, 30),
        NOW,
    );
    assert!(matches!(result, Err(LicenseError::Decryption(_))));
}

#[test]
fn tampered_integrity_hash_rejected() {
    let request = request_token("abc123");
    let mut envelope: RequestEnvelope = codec::decode_as(&request, Tag::Request).unwrap();
    envelope.integrity_hash[0] ^= 0xFF;
    let tampered = codec::encode(&envelope, Tag::Request).unwrap();

    let result = issuer().open_request(&tampered);
    assert!(matches!(result, Err(LicenseError::Integrity(_))));
}

#[test]
fn tampered_request_cipher_rejected() {
    let request = request_token("abc123");
    let mut envelope: RequestEnvelope = codec::decode_as(&request, Tag::Request).unwrap();
    let last = envelope.cipher_data.len() - 1;
    envelope.cipher_data[last] ^= 0x01;
    let tampered = codec::encode(&envelope, Tag::Request).unwrap();

    let result = issuer().open_request(&tampered);
    assert!(matches!(result, Err(LicenseError::Integrity(_))));
}

#[test]
fn seal_rejects_inverted_window() {
    let license = license_with_window("abc123", NOW, NOW - DAY);
    assert!(matches!(
        issuer().seal(&license),
        Err(LicenseError::InvalidArgument(_))
    ));
}
