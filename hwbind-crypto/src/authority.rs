//! RSA key material of the license authority.
//!
//! The authority's public key is embedded in (or shipped with) every client:
//! clients wrap request keys with it and verify license signatures against
//! it. The private key stays with the issuer.
//!
//! - key wrapping: RSA-OAEP with SHA-256
//! - signatures: RSA PKCS#1 v1.5 over SHA-256 of the canonical record bytes

use crate::canonical::to_canonical_bytes;
use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// The authority's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorityPublicKey(RsaPublicKey);

impl AuthorityPublicKey {
    /// Parses a PEM public key (`BEGIN PUBLIC KEY` or `BEGIN RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let pem = pem.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(format!("unreadable public key: {e}")))
    }

    /// Encodes as SubjectPublicKeyInfo PEM.
    pub fn to_pem(&self) -> CryptoResult<String> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }

    /// RSA-OAEP(SHA-256) encryption. Only meant for small payloads such as keys.
    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.0
            .encrypt(&mut rand::rngs::OsRng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    /// Wraps a one-time symmetric key for the authority.
    pub fn wrap_key(&self, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
        self.encrypt(key.as_bytes())
    }

    /// Verifies a PKCS#1 v1.5 signature over `bytes`, as produced by
    /// [`AuthorityKeyPair::sign_record`] over a record's canonical bytes.
    pub fn verify_bytes(&self, bytes: &[u8], signature: &[u8]) -> bool {
        let hashed = Sha256::digest(bytes);
        self.0
            .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
            .is_ok()
    }
}

/// The authority's full key pair. Held only by the issuer.
#[derive(Clone)]
pub struct AuthorityKeyPair {
    private: RsaPrivateKey,
    public: AuthorityPublicKey,
}

impl AuthorityKeyPair {
    /// Parses a PEM private key (`BEGIN RSA PRIVATE KEY` or `BEGIN PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let pem = pem.trim();
        let private = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("unreadable private key: {e}")))?;
        Ok(Self::from_private(private))
    }

    fn from_private(private: RsaPrivateKey) -> Self {
        let public = AuthorityPublicKey(private.to_public_key());
        Self { private, public }
    }

    /// Encodes the private key as PKCS#1 PEM.
    pub fn to_pem(&self) -> CryptoResult<String> {
        self.private
            .to_pkcs1_pem(LineEnding::LF)
            .map(|pem| pem.as_str().to_owned())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Returns the public half.
    pub fn public_key(&self) -> &AuthorityPublicKey {
        &self.public
    }

    /// RSA-OAEP(SHA-256) decryption.
    pub fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::Decryption(e.to_string()))
    }

    /// Unwraps a symmetric key produced by [`AuthorityPublicKey::wrap_key`].
    pub fn unwrap_key(&self, wrapped: &[u8]) -> CryptoResult<SymmetricKey> {
        let bytes = self.decrypt(wrapped)?;
        SymmetricKey::from_slice(&bytes)
    }

    /// Signs the canonical bytes of `record` with PKCS#1 v1.5 over SHA-256.
    pub fn sign_record<T: Serialize>(&self, record: &T) -> CryptoResult<Vec<u8>> {
        let bytes = to_canonical_bytes(record)?;
        let hashed = Sha256::digest(&bytes);
        self.private
            .sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for AuthorityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityKeyPair")
            .field("private", &"[REDACTED]")
            .field("bits", &self.public.bits())
            .finish()
    }
}
