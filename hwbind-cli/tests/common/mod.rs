//! Shared test helpers for CLI tests.

#![allow(dead_code)]

use hwbind_crypto::{AuthorityKeyPair, AuthorityPublicKey};
use hwbind_license::{
    IssueOptions, LicenseEdition, LicenseIssuer, RequestBuilder, StaticFingerprint,
};
use std::path::{Path, PathBuf};

pub const AUTHORITY_PRIVATE_PEM: &str = include_str!("../../../testdata/authority_private.pem");
pub const AUTHORITY_PUBLIC_PEM: &str = include_str!("../../../testdata/authority_public.pem");

/// Fixed "current time" for deterministic checks (2023-11-14).
pub const NOW: i64 = 1_700_000_000;

pub const DAY: i64 = 86_400;

pub const MACHINE: &str = "abc123";

pub fn authority() -> AuthorityKeyPair {
    AuthorityKeyPair::from_pem(AUTHORITY_PRIVATE_PEM).unwrap()
}

pub fn authority_public() -> AuthorityPublicKey {
    AuthorityPublicKey::from_pem(AUTHORITY_PUBLIC_PEM).unwrap()
}

pub fn machine() -> StaticFingerprint {
    StaticFingerprint::new(MACHINE).with_machine_info("test-host (linux 6.1, x86_64)")
}

/// A license for `hardware_id` issued at [`NOW`].
pub fn issue_for(hardware_id: &str, edition: LicenseEdition, days: i64) -> String {
    let public = authority_public();
    let request = RequestBuilder::new(&public, hardware_id)
        .build_at(NOW)
        .unwrap();
    let options = IssueOptions {
        days,
        edition,
        ..IssueOptions::default()
    };
    LicenseIssuer::new(authority())
        .issue_at(&request, &options, NOW)
        .unwrap()
}

/// License and request paths under `dir`, laid out as `bin/license.dat`
/// and `bin/req.dat`.
pub fn bin_paths(dir: &Path) -> (PathBuf, PathBuf) {
    let bin = dir.join("bin");
    (bin.join("license.dat"), bin.join("req.dat"))
}
