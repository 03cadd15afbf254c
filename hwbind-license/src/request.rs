//! Building license requests.

use crate::codec::{self, Tag};
use crate::error::LicenseResult;
use crate::model::{Request, RequestEnvelope};
use hwbind_crypto::{hash_record, seal_record, AuthorityPublicKey};
use rand::RngCore;
use tracing::info;

/// Version reported when the caller does not set one.
pub const DEFAULT_APP_VERSION: &str = "1.0.0";

/// Assembles a request for the authority and seals it.
///
/// ```ignore
/// let token = RequestBuilder::new(&authority, fingerprint)
///     .version("2.1.0")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder<'a> {
    authority: &'a AuthorityPublicKey,
    hardware_id: String,
    version: String,
    machine_info: String,
}

impl<'a> RequestBuilder<'a> {
    /// Starts a request for the machine identified by `hardware_id`.
    pub fn new(authority: &'a AuthorityPublicKey, hardware_id: impl Into<String>) -> Self {
        Self {
            authority,
            hardware_id: hardware_id.into(),
            version: DEFAULT_APP_VERSION.to_string(),
            machine_info: String::new(),
        }
    }

    /// Sets the application version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the machine description.
    #[must_use]
    pub fn machine_info(mut self, machine_info: impl Into<String>) -> Self {
        self.machine_info = machine_info.into();
        self
    }

    /// Builds and seals the request at the current time.
    pub fn build_envelope(&self) -> LicenseResult<RequestEnvelope> {
        self.build_envelope_at(chrono::Utc::now().timestamp())
    }

    /// Builds and seals the request as of `now` (seconds since epoch).
    ///
    /// # Errors
    ///
    /// Propagates the first serialization or encryption failure.
    pub fn build_envelope_at(&self, now: i64) -> LicenseResult<RequestEnvelope> {
        let request = Request {
            hardware_id: self.hardware_id.clone(),
            timestamp: now,
            version: self.version.clone(),
            machine_info: self.machine_info.clone(),
            request_id: generate_request_id(),
        };

        let integrity_hash = hash_record(&request)?;
        let sealed = seal_record(&request, self.authority)?;

        info!(request_id = %request.request_id, "built license request");

        Ok(RequestEnvelope {
            cipher_data: sealed.ciphertext,
            wrapped_key: sealed.wrapped_key,
            integrity_hash: integrity_hash.to_vec(),
            timestamp: now,
        })
    }

    /// Builds, seals and encodes the request as a `"REQ:"` token.
    pub fn build(&self) -> LicenseResult<String> {
        codec::encode(&self.build_envelope()?, Tag::Request)
    }

    /// Like [`build`](Self::build), as of `now`.
    pub fn build_at(&self, now: i64) -> LicenseResult<String> {
        codec::encode(&self.build_envelope_at(now)?, Tag::Request)
    }
}

/// 128 random bits as 32 lowercase hex characters.
fn generate_request_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
