//! Startup license check.
//!
//! Validates the installed license and, when there is none or it no longer
//! validates, leaves a fresh request next to it for the operator to send to
//! the authority.

use anyhow::{bail, Context, Result};
use hwbind_crypto::AuthorityPublicKey;
use hwbind_license::{
    FingerprintProvider, LicenseError, LicenseValidator, RequestBuilder, ValidatedLicense,
    ValidationState, DEFAULT_APP_VERSION,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Remaining days at or below which expiry is a warning.
pub const EXPIRY_WARNING_DAYS: i64 = 7;

/// Remaining days at or below which expiry is mentioned.
pub const EXPIRY_NOTICE_DAYS: i64 = 30;

/// Checks the installed license and keeps a current request on disk.
pub struct AutoCheck<P> {
    authority: AuthorityPublicKey,
    validator: LicenseValidator,
    provider: P,
    license_path: PathBuf,
    request_path: PathBuf,
    app_version: String,
}

impl<P: FingerprintProvider> AutoCheck<P> {
    /// Creates a check of `license_path` that writes requests to
    /// `request_path`.
    pub fn new(
        authority: AuthorityPublicKey,
        provider: P,
        license_path: impl Into<PathBuf>,
        request_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            validator: LicenseValidator::new(authority.clone()),
            authority,
            provider,
            license_path: license_path.into(),
            request_path: request_path.into(),
            app_version: DEFAULT_APP_VERSION.to_string(),
        }
    }

    /// Sets the version recorded in new requests.
    #[must_use]
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Runs the check at the current time.
    pub fn run(&self, module: Option<&str>) -> Result<ValidatedLicense> {
        self.run_at(module, chrono::Utc::now().timestamp())
    }

    /// Runs the check as of `now`.
    ///
    /// # Errors
    ///
    /// Fails whenever the license is not usable: it is missing, it does not
    /// validate, or it does not grant `module`. The first two leave a request
    /// at the request path.
    pub fn run_at(&self, module: Option<&str>, now: i64) -> Result<ValidatedLicense> {
        if let Some(dir) = self.license_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }

        let fingerprint = self.provider.fingerprint();
        let result = self
            .validator
            .validate_file_at(&self.license_path, &fingerprint, now);
        let state = ValidationState::from_result(&result);
        debug!(state = ?state, path = ?self.license_path, "license checked");

        let validated = match result {
            Ok(validated) => validated,
            Err(LicenseError::Missing(path)) => return self.handle_missing(&path, now),
            Err(err) => return self.handle_invalid(err, now),
        };

        if let Some(module) = module {
            validated
                .require_module(module)
                .context("Module authorization check failed")?;
        }

        let remaining = validated.remaining_days(now);
        if remaining <= EXPIRY_WARNING_DAYS {
            warn!(remaining_days = remaining, "license expires soon");
        } else if remaining <= EXPIRY_NOTICE_DAYS {
            info!(remaining_days = remaining, "license expires in {} days", remaining);
        }

        Ok(validated)
    }

    fn handle_missing(&self, license_path: &Path, now: i64) -> Result<ValidatedLicense> {
        warn!("No license at {:?}", license_path);
        if self.request_path.exists() {
            bail!(
                "Awaiting license: send {} to the license authority",
                self.request_path.display()
            );
        }

        self.write_request(now)?;
        bail!(
            "Awaiting license: request written to {}, send it to the license authority",
            self.request_path.display()
        )
    }

    fn handle_invalid(&self, err: LicenseError, now: i64) -> Result<ValidatedLicense> {
        warn!(state = ?err.state(), "License invalid: {}", err);
        if self.request_path.exists() {
            let backup = backup_path(&self.request_path, now);
            fs::rename(&self.request_path, &backup).with_context(|| {
                format!("Failed to back up request to {}", backup.display())
            })?;
            info!("Backed up previous request to {:?}", backup);
        }

        self.write_request(now)?;
        Err(anyhow::Error::new(err).context(format!(
            "License invalid: new request written to {}",
            self.request_path.display()
        )))
    }

    fn write_request(&self, now: i64) -> Result<()> {
        let token = RequestBuilder::new(&self.authority, self.provider.fingerprint())
            .version(self.app_version.clone())
            .machine_info(self.provider.machine_info())
            .build_at(now)
            .context("Failed to build license request")?;

        if let Some(dir) = self.request_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        fs::write(&self.request_path, token).with_context(|| {
            format!("Failed to write request {}", self.request_path.display())
        })?;
        info!("Wrote license request to {:?}", self.request_path);
        Ok(())
    }
}

/// `<request>.backup.<unix-ts>`
fn backup_path(request_path: &Path, now: i64) -> PathBuf {
    let mut name = request_path.as_os_str().to_owned();
    name.push(format!(".backup.{now}"));
    PathBuf::from(name)
}
