//! License output file names.

use chrono::NaiveDate;
use hwbind_license::LicenseEdition;
use std::path::Path;

/// Output name `licgen` uses unless told otherwise.
pub const DEFAULT_LICENSE_OUTPUT: &str = "license.dat";

/// Builds `license_<PREFIX>_<customer>_<hwid>_<date>.dat`.
///
/// The hardware ID and date come from the request file name when it follows
/// `req_<serial>_<hwid>_<date>.dat` or `req_<hwid>_<date>.dat`. Otherwise the
/// hardware ID is `unknown` and the date is `today`.
#[must_use]
pub fn license_file_name(
    request_path: &Path,
    edition: LicenseEdition,
    customer: &str,
    today: NaiveDate,
) -> String {
    let (hardware_id, date) = request_name_parts(request_path)
        .unwrap_or_else(|| ("unknown".to_string(), today.format("%Y%m%d").to_string()));

    format!(
        "license_{}_{}_{}_{}.dat",
        edition.serial_prefix(),
        clean_customer(customer),
        hardware_id,
        date
    )
}

fn request_name_parts(request_path: &Path) -> Option<(String, String)> {
    let stem = request_path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.first() != Some(&"req") {
        return None;
    }
    // `req_unknown_<hwid>_<date>` is covered by the four-part form.
    match parts.len() {
        0..=2 => None,
        3 => Some((parts[1].to_string(), parts[2].to_string())),
        _ => Some((parts[2].to_string(), parts[3].to_string())),
    }
}

fn clean_customer(customer: &str) -> String {
    let cleaned: String = customer
        .chars()
        .filter(|c| !matches!(c, ' ' | '/' | '\\'))
        .collect();
    if cleaned.is_empty() {
        "customer".to_string()
    } else {
        cleaned
    }
}
