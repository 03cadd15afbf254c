use chrono::NaiveDate;
use hwbind_cli::license_file_name;
use hwbind_license::LicenseEdition;
use pretty_assertions::assert_eq;
use std::path::Path;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

#[test]
fn serial_form_request_name() {
    let name = license_file_name(
        Path::new("inbox/req_NSE-1a2b3c_4f9e0a_20240301.dat"),
        LicenseEdition::Enterprise,
        "ACME",
        today(),
    );
    assert_eq!(name, "license_NSE_ACME_4f9e0a_20240301.dat");
}

#[test]
fn short_form_request_name() {
    let name = license_file_name(
        Path::new("req_4f9e0a_20240301.dat"),
        LicenseEdition::Basic,
        "ACME",
        today(),
    );
    assert_eq!(name, "license_NSB_ACME_4f9e0a_20240301.dat");
}

#[test]
fn unknown_serial_request_name() {
    let name = license_file_name(
        Path::new("req_unknown_4f9e0a_20240301.dat"),
        LicenseEdition::Basic,
        "ACME",
        today(),
    );
    assert_eq!(name, "license_NSB_ACME_4f9e0a_20240301.dat");
}

#[test]
fn unrecognized_request_name_uses_today() {
    let name = license_file_name(
        Path::new("req.dat"),
        LicenseEdition::Enterprise,
        "",
        today(),
    );
    assert_eq!(name, "license_NSE_customer_unknown_20240309.dat");
}

#[test]
fn customer_name_is_cleaned() {
    let name = license_file_name(
        Path::new("request.dat"),
        LicenseEdition::Enterprise,
        "Big Co/West\\2",
        today(),
    );
    assert_eq!(name, "license_NSE_BigCoWest2_unknown_20240309.dat");
}
