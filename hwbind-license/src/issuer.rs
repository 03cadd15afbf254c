//! License issuance.
//!
//! The issuer opens a request with the authority private key, derives the
//! license terms from the requested edition, signs the license, and seals it
//! under the key derived from the requesting machine's fingerprint.

use crate::codec::{self, Tag};
use crate::edition::LicenseEdition;
use crate::error::{LicenseError, LicenseResult};
use crate::model::{License, LicenseEnvelope, Request, RequestEnvelope};
use crate::{FORMAT_VERSION, SECS_PER_DAY};
use hwbind_crypto::{
    derive_hardware_key, encrypt_record, hash_record, open_record, sha256_str, AuthorityKeyPair,
    SealedRecord,
};
use tracing::{debug, info, warn};

/// Who the license is issued to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub org: String,
}

/// Terms requested for one license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOptions {
    /// Validity period in days. Must be positive.
    pub days: i64,
    pub customer: CustomerInfo,
    pub edition: LicenseEdition,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            days: 365,
            customer: CustomerInfo::default(),
            edition: LicenseEdition::default(),
        }
    }
}

/// Issues licenses with the authority key pair.
#[derive(Debug, Clone)]
pub struct LicenseIssuer {
    authority: AuthorityKeyPair,
}

impl LicenseIssuer {
    /// Creates an issuer holding the authority key pair.
    pub fn new(authority: AuthorityKeyPair) -> Self {
        Self { authority }
    }

    /// Opens a `"REQ:"` token and checks its integrity hash.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::Format`] / `Encoding` / `Corruption` for a malformed
    ///   or foreign token
    /// - [`LicenseError::Decryption`] if the request was sealed for another
    ///   authority
    /// - [`LicenseError::Integrity`] if the payload fails authentication or
    ///   does not match the integrity hash
    pub fn open_request(&self, token: &str) -> LicenseResult<Request> {
        let envelope: RequestEnvelope = codec::decode_as(token, Tag::Request)?;

        let sealed = SealedRecord {
            ciphertext: envelope.cipher_data,
            wrapped_key: envelope.wrapped_key,
        };
        let request: Request = open_record(&sealed, &self.authority)?;

        let actual = hash_record(&request)?;
        if actual.as_slice() != envelope.integrity_hash.as_slice() {
            warn!(
                request_id = %request.request_id,
                expected = %hex::encode(&envelope.integrity_hash),
                actual = %hex::encode(actual),
                "request integrity hash mismatch"
            );
            return Err(LicenseError::Integrity(
                "request hash does not match its contents".to_string(),
            ));
        }

        debug!(request_id = %request.request_id, "opened license request");
        Ok(request)
    }

    /// Issues a license for a request token at the current time.
    pub fn issue(&self, token: &str, options: &IssueOptions) -> LicenseResult<String> {
        self.issue_at(token, options, chrono::Utc::now().timestamp())
    }

    /// Issues a license for a request token as of `now` (seconds since epoch).
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidArgument`] if `options.days` is not positive,
    /// otherwise as [`open_request`](Self::open_request) and
    /// [`seal`](Self::seal).
    pub fn issue_at(&self, token: &str, options: &IssueOptions, now: i64) -> LicenseResult<String> {
        let license = self.build_license(token, options, now)?;
        self.seal(&license)
    }

    /// Opens a request and builds the license it would receive, unsealed.
    pub fn build_license(
        &self,
        token: &str,
        options: &IssueOptions,
        now: i64,
    ) -> LicenseResult<License> {
        if options.days <= 0 {
            return Err(LicenseError::InvalidArgument(format!(
                "validity must be a positive number of days, got {}",
                options.days
            )));
        }
        let validity = options
            .days
            .checked_mul(SECS_PER_DAY)
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| {
                LicenseError::InvalidArgument(format!("validity of {} days overflows", options.days))
            })?;

        let request = self.open_request(token)?;
        let edition = options.edition;

        Ok(License {
            customer_id: customer_id(&request.hardware_id),
            license_key: license_key(&request.hardware_id, edition),
            serial_number: serial_number(&request.hardware_id, edition),
            hardware_id: request.hardware_id,
            issued_at: now,
            expires_at: validity,
            edition: Some(edition),
            modules: edition.modules(),
            module_perms: edition.module_permissions(),
            customer_name: options.customer.name.clone(),
            customer_org: options.customer.org.clone(),
            max_scans: edition.max_scans(),
            max_assets: edition.max_assets(),
            max_users: edition.max_users(),
            features: edition.features(),
            request_id: request.request_id,
        })
    }

    /// Signs a license and seals it for the machine it names.
    ///
    /// # Process
    /// 1. Sign the canonical license with the authority private key
    /// 2. Derive the key from the license's hardware ID
    /// 3. Encrypt the license under that key
    /// 4. Encode the envelope as a `"LIC:"` token
    pub fn seal(&self, license: &License) -> LicenseResult<String> {
        if license.issued_at > license.expires_at {
            return Err(LicenseError::InvalidArgument(
                "license expires before it is issued".to_string(),
            ));
        }

        let signature = self.authority.sign_record(license)?;

        let key = derive_hardware_key(&license.hardware_id);
        let cipher_data = encrypt_record(&key, license)?;
        let envelope = LicenseEnvelope {
            cipher_data,
            key_check: key.key_check_digest().to_vec(),
            signature,
            format_version: FORMAT_VERSION.to_string(),
        };

        info!(
            request_id = %license.request_id,
            serial = %license.serial_number,
            edition = ?license.edition,
            expires_at = license.expires_at,
            "issued license"
        );

        codec::encode(&envelope, Tag::License)
    }
}

/// `hex(SHA256("customer_" + hardware_id)[..8])`.
#[must_use]
pub fn customer_id(hardware_id: &str) -> String {
    hex::encode(&sha256_str(&format!("customer_{hardware_id}"))[..8])
}

/// `PREFIX-hex(SHA256("serial_" + hardware_id + edition)[..6])`.
#[must_use]
pub fn serial_number(hardware_id: &str, edition: LicenseEdition) -> String {
    let digest = sha256_str(&format!("serial_{hardware_id}{edition}"));
    format!("{}-{}", edition.serial_prefix(), hex::encode(&digest[..6]))
}

/// `hex(SHA256("license_key_" + hardware_id + edition)[..16])`.
#[must_use]
pub fn license_key(hardware_id: &str, edition: LicenseEdition) -> String {
    hex::encode(&sha256_str(&format!("license_key_{hardware_id}{edition}"))[..16])
}
