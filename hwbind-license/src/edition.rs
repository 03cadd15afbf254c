//! License editions and the terms each one grants by default.

use crate::error::LicenseError;
use crate::model::{ModuleId, ModulePermission, Quota};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The license edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseEdition {
    /// Admission control only, with capped quotas.
    Basic,
    /// Every module, unlimited.
    #[default]
    Enterprise,
}

const MODULE_PERMISSIONS: [&str; 3] = ["read", "write", "execute"];

impl LicenseEdition {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Enterprise => "enterprise",
        }
    }

    /// Prefix of serial numbers and license file names.
    #[must_use]
    pub fn serial_prefix(&self) -> &'static str {
        match self {
            Self::Basic => "NSB",
            Self::Enterprise => "NSE",
        }
    }

    /// Modules granted by this edition.
    #[must_use]
    pub fn modules(&self) -> Vec<ModuleId> {
        match self {
            Self::Basic => vec![ModuleId::new(ModuleId::ADMISSION)],
            Self::Enterprise => ModuleId::known(),
        }
    }

    /// Detailed permissions for each module granted by this edition.
    #[must_use]
    pub fn module_permissions(&self) -> Vec<ModulePermission> {
        self.modules()
            .into_iter()
            .map(|module| ModulePermission {
                features: module_features(&module),
                permissions: MODULE_PERMISSIONS.iter().map(|p| (*p).to_string()).collect(),
                module,
                enabled: true,
                max_scans: Quota::UNLIMITED,
                max_targets: Quota::UNLIMITED,
            })
            .collect()
    }

    /// Global scan quota.
    #[must_use]
    pub fn max_scans(&self) -> Quota {
        match self {
            Self::Basic => Quota(1000),
            Self::Enterprise => Quota::UNLIMITED,
        }
    }

    /// Asset quota.
    #[must_use]
    pub fn max_assets(&self) -> Quota {
        match self {
            Self::Basic => Quota(500),
            Self::Enterprise => Quota::UNLIMITED,
        }
    }

    /// User quota.
    #[must_use]
    pub fn max_users(&self) -> Quota {
        match self {
            Self::Basic => Quota(3),
            Self::Enterprise => Quota::UNLIMITED,
        }
    }

    /// Global feature flags.
    #[must_use]
    pub fn features(&self) -> Vec<String> {
        let features: &[&str] = match self {
            Self::Basic => &["basic_scanning", "device_management", "basic_reporting"],
            Self::Enterprise => &[
                "full_scanning",
                "advanced_reporting",
                "api_access",
                "custom_templates",
            ],
        };
        features.iter().map(|f| (*f).to_string()).collect()
    }

    /// Edition implied by a license without an explicit edition.
    #[must_use]
    pub fn infer(module_count: usize) -> Self {
        if module_count <= 1 {
            Self::Basic
        } else {
            Self::Enterprise
        }
    }
}

fn module_features(module: &ModuleId) -> BTreeSet<String> {
    let features: &[&str] = match module.as_str() {
        ModuleId::ADMISSION => &["device_discovery", "nac_control", "device_management"],
        ModuleId::VULNERABILITY_SCAN => &["network_scan", "port_scan", "service_detection", "vuln_scan"],
        ModuleId::PASSWORD_AUDIT => &["weak_password_scan", "password_policy_check", "brute_force"],
        ModuleId::CAMERA_SCAN => &["camera_discovery", "onvif_scan", "camera_security_check"],
        _ => &[],
    };
    features.iter().map(|f| (*f).to_string()).collect()
}

impl fmt::Display for LicenseEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseEdition {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "b" => Ok(Self::Basic),
            "enterprise" | "e" => Ok(Self::Enterprise),
            other => Err(LicenseError::InvalidArgument(format!(
                "unknown edition '{other}' (expected basic or enterprise)"
            ))),
        }
    }
}
