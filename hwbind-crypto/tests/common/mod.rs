//! Shared test helpers for crypto tests.

#![allow(dead_code)]

use hwbind_crypto::{AuthorityKeyPair, AuthorityPublicKey};

pub const AUTHORITY_PRIVATE_PEM: &str = include_str!("../../../testdata/authority_private.pem");
pub const AUTHORITY_PUBLIC_PEM: &str = include_str!("../../../testdata/authority_public.pem");
pub const FOREIGN_PRIVATE_PEM: &str = include_str!("../../../testdata/foreign_private.pem");

/// The fixture authority key pair (RSA-2048, PKCS#1 PEM).
pub fn authority() -> AuthorityKeyPair {
    AuthorityKeyPair::from_pem(AUTHORITY_PRIVATE_PEM).unwrap()
}

/// The fixture authority public key, parsed from its own SPKI PEM.
pub fn authority_public() -> AuthorityPublicKey {
    AuthorityPublicKey::from_pem(AUTHORITY_PUBLIC_PEM).unwrap()
}

/// An unrelated key pair, for wrong-authority tests.
pub fn foreign_authority() -> AuthorityKeyPair {
    AuthorityKeyPair::from_pem(FOREIGN_PRIVATE_PEM).unwrap()
}
