//! Command-line plumbing for hwbind: file naming, license reports and the
//! startup auto-check.

mod auto;
mod naming;
mod report;

pub use auto::{AutoCheck, EXPIRY_NOTICE_DAYS, EXPIRY_WARNING_DAYS};
pub use naming::{license_file_name, DEFAULT_LICENSE_OUTPUT};
pub use report::{hardware_report, license_report, LicenseReport};
