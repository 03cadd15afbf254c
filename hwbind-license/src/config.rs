//! Tool configuration.
//!
//! Loaded from `<config dir>/hwbind/config.toml` unless a path is given.
//! Every field is optional:
//!
//! ```toml
//! license_path = "bin/license.dat"
//! request_path = "bin/req.dat"
//! app_version = "1.0.0"
//! default_days = 365
//! default_edition = "enterprise"
//!
//! [public_key]
//! file = "keys/authority_public.pem"
//!
//! [private_key]
//! file = "keys/authority_private.pem"
//! ```

use crate::edition::LicenseEdition;
use crate::error::{LicenseError, LicenseResult};
use crate::request::DEFAULT_APP_VERSION;
use hwbind_crypto::{AuthorityKeyPair, AuthorityPublicKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where PEM key material comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// PEM text inline.
    Pem(String),
    /// Path to a PEM file.
    File(PathBuf),
}

impl KeySource {
    /// Returns the PEM text.
    pub fn read_pem(&self) -> LicenseResult<String> {
        match self {
            Self::Pem(pem) => Ok(pem.clone()),
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                LicenseError::Config(format!("cannot read key file {}: {e}", path.display()))
            }),
        }
    }

    /// Loads an authority public key.
    pub fn public_key(&self) -> LicenseResult<AuthorityPublicKey> {
        Ok(AuthorityPublicKey::from_pem(&self.read_pem()?)?)
    }

    /// Loads an authority key pair.
    pub fn key_pair(&self) -> LicenseResult<AuthorityKeyPair> {
        Ok(AuthorityKeyPair::from_pem(&self.read_pem()?)?)
    }
}

/// hwbind configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HwbindConfig {
    /// Authority public key, needed to build requests and validate licenses.
    pub public_key: Option<KeySource>,
    /// Authority private key, needed only to issue licenses.
    pub private_key: Option<KeySource>,
    /// License file checked by `liccheck` and `auto`.
    pub license_path: PathBuf,
    /// Request file written by `auto`.
    pub request_path: PathBuf,
    /// Version recorded in new requests.
    pub app_version: String,
    /// Validity period for new licenses.
    pub default_days: u32,
    /// Edition for new licenses.
    pub default_edition: LicenseEdition,
}

impl Default for HwbindConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            private_key: None,
            license_path: PathBuf::from("bin/license.dat"),
            request_path: PathBuf::from("bin/req.dat"),
            app_version: DEFAULT_APP_VERSION.to_string(),
            default_days: 365,
            default_edition: LicenseEdition::default(),
        }
    }
}

impl HwbindConfig {
    /// Default config file location, `<config dir>/hwbind/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hwbind").join("config.toml"))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> LicenseResult<Self> {
        toml::from_str(text).map_err(|e| LicenseError::Config(e.to_string()))
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Config`] if the file is unreadable or not valid TOML.
    pub fn load(path: &Path) -> LicenseResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LicenseError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Loads configuration from a file, or the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> LicenseResult<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Loads the configured authority public key.
    pub fn authority_public_key(&self) -> LicenseResult<AuthorityPublicKey> {
        self.public_key
            .as_ref()
            .ok_or_else(|| LicenseError::Config("no public_key configured".to_string()))?
            .public_key()
    }

    /// Loads the configured authority key pair.
    pub fn authority_key_pair(&self) -> LicenseResult<AuthorityKeyPair> {
        self.private_key
            .as_ref()
            .ok_or_else(|| LicenseError::Config("no private_key configured".to_string()))?
            .key_pair()
    }
}
