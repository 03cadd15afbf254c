//! The resolved permission view of a license.
//!
//! Older licenses carry only a flat `modules` list; newer ones carry
//! per-module records. Both are resolved once, when the license is loaded.

use crate::edition::LicenseEdition;
use crate::model::{License, ModuleId, ModulePermission};

/// Module authorization resolved from a [`License`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entitlements {
    /// Per-module records; a module is authorized iff its record is enabled.
    Detailed(Vec<ModulePermission>),
    /// Flat module list; membership authorizes.
    Legacy(Vec<ModuleId>),
}

impl Entitlements {
    /// Resolves the authoritative permission source of a license.
    #[must_use]
    pub fn resolve(license: &License) -> Self {
        if license.module_perms.is_empty() {
            Self::Legacy(license.modules.clone())
        } else {
            Self::Detailed(license.module_perms.clone())
        }
    }

    /// Returns true if `module` is authorized.
    #[must_use]
    pub fn is_authorized(&self, module: &str) -> bool {
        match self {
            Self::Detailed(perms) => perms.iter().any(|p| p.module == *module && p.enabled),
            Self::Legacy(modules) => modules.iter().any(|m| m == module),
        }
    }

    /// The detailed record for `module`, if this license has one.
    #[must_use]
    pub fn permission(&self, module: &str) -> Option<&ModulePermission> {
        match self {
            Self::Detailed(perms) => perms.iter().find(|p| p.module == *module),
            Self::Legacy(_) => None,
        }
    }

    /// Every authorized module.
    #[must_use]
    pub fn authorized_modules(&self) -> Vec<&ModuleId> {
        match self {
            Self::Detailed(perms) => perms
                .iter()
                .filter(|p| p.enabled)
                .map(|p| &p.module)
                .collect(),
            Self::Legacy(modules) => modules.iter().collect(),
        }
    }

    /// Number of modules the license names, enabled or not.
    #[must_use]
    pub fn module_count(&self) -> usize {
        match self {
            Self::Detailed(perms) => perms.len(),
            Self::Legacy(modules) => modules.len(),
        }
    }

    /// The license's edition, inferred from the module count when absent.
    #[must_use]
    pub fn edition_of(&self, license: &License) -> LicenseEdition {
        license
            .edition
            .unwrap_or_else(|| LicenseEdition::infer(self.module_count()))
    }
}
