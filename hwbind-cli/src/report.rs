//! Human-readable summaries printed by `liccheck` and `hwinfo`.

use chrono::DateTime;
use hwbind_license::{FingerprintProvider, ValidatedLicense};
use std::fmt;

fn format_time(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Summary of a validated license as of a point in time.
#[derive(Debug, Clone, Copy)]
pub struct LicenseReport<'a> {
    validated: &'a ValidatedLicense,
    now: i64,
}

/// Summarizes a validated license as of `now`.
#[must_use]
pub fn license_report(validated: &ValidatedLicense, now: i64) -> LicenseReport<'_> {
    LicenseReport { validated, now }
}

impl fmt::Display for LicenseReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let validated = self.validated;
        let license = validated.license();

        writeln!(f, "  Customer ID:   {}", license.customer_id)?;
        if !license.customer_name.is_empty() {
            write!(f, "  Customer:      {}", license.customer_name)?;
            if !license.customer_org.is_empty() {
                write!(f, " ({})", license.customer_org)?;
            }
            writeln!(f)?;
        }
        if !license.serial_number.is_empty() {
            writeln!(f, "  Serial:        {}", license.serial_number)?;
        }
        writeln!(f, "  Edition:       {}", validated.edition())?;
        writeln!(f, "  Issued:        {}", format_time(license.issued_at))?;
        writeln!(f, "  Expires:       {}", format_time(license.expires_at))?;

        let remaining = validated.remaining_days(self.now);
        if remaining > 0 {
            writeln!(f, "  Remaining:     {remaining} days")?;
        }

        writeln!(f, "  Max scans:     {}", license.max_scans)?;
        writeln!(f, "  Max assets:    {}", license.max_assets)?;
        writeln!(f, "  Max users:     {}", license.max_users)?;

        let modules: Vec<&str> = validated
            .entitlements()
            .authorized_modules()
            .into_iter()
            .map(|m| m.as_str())
            .collect();
        writeln!(f, "  Modules:       {}", modules.join(", "))?;
        writeln!(f, "  Features:      {}", license.features.join(", "))
    }
}

/// Describes the machine a provider reports.
#[must_use]
pub fn hardware_report(provider: &dyn FingerprintProvider) -> String {
    format!(
        "  Fingerprint:   {}\n  Machine:       {}\n",
        provider.fingerprint(),
        provider.machine_info()
    )
}
