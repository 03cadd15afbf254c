//! Hardware fingerprinting for license binding.
//!
//! Generates a stable identifier for this machine. Licenses are encrypted
//! under a key derived from it, so the identifier must survive reboots and
//! hostname changes but change when the hardware does.

use sha2::{Digest, Sha256};
use std::env;
use std::fmt;

/// Source of the machine identity a license is bound to.
pub trait FingerprintProvider {
    /// A stable, opaque string identifying this machine.
    fn fingerprint(&self) -> String;

    /// A human-readable description of this machine.
    fn machine_info(&self) -> String;
}

/// Fingerprint of the machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFingerprint;

impl FingerprintProvider for SystemFingerprint {
    /// Lowercase hex SHA-256 of the hardware identifiers joined with `|`.
    fn fingerprint(&self) -> String {
        let mut ids: Vec<String> = collect_hardware_ids()
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && id != "N/A")
            .collect();

        if ids.is_empty() {
            ids.push(format!("fallback_{}_{}", env::consts::OS, env::consts::ARCH));
        }

        hex::encode(Sha256::digest(ids.join("|").as_bytes()))
    }

    fn machine_info(&self) -> String {
        MachineInfo::collect().to_string()
    }
}

/// Fixed fingerprint, for tests and for issuing on behalf of another machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFingerprint {
    fingerprint: String,
    machine_info: String,
}

impl StaticFingerprint {
    /// Creates a provider that always reports `fingerprint`.
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            machine_info: String::new(),
        }
    }

    /// Sets the reported machine description.
    #[must_use]
    pub fn with_machine_info(mut self, machine_info: impl Into<String>) -> Self {
        self.machine_info = machine_info.into();
        self
    }
}

impl FingerprintProvider for StaticFingerprint {
    fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }

    fn machine_info(&self) -> String {
        self.machine_info.clone()
    }
}

/// Information about the current machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    /// Operating system name.
    pub os_name: String,
    /// Operating system version.
    pub os_version: String,
    /// Hostname.
    pub hostname: String,
    /// CPU architecture.
    pub arch: String,
}

impl MachineInfo {
    /// Collects information about the current machine.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os_name: env::consts::OS.to_string(),
            os_version: get_os_version(),
            hostname: get_hostname(),
            arch: env::consts::ARCH.to_string(),
        }
    }
}

impl fmt::Display for MachineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}, {})",
            self.hostname, self.os_name, self.os_version, self.arch
        )
    }
}

/// Collects hardware identifiers for fingerprinting.
///
/// Hostname and user name are not included.
fn collect_hardware_ids() -> Vec<String> {
    let mut ids = Vec::new();

    // Machine ID (platform-specific, very stable)
    if let Some(machine_id) = get_machine_id() {
        ids.push(machine_id);
    }

    // CPU model
    if let Some(cpu) = get_cpu_model() {
        ids.push(cpu);
    }

    // Board / BIOS UUID
    if let Some(uuid) = get_system_uuid() {
        ids.push(uuid);
    }

    ids
}

/// Gets the machine hostname.
fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gets the OS version string.
fn get_os_version() -> String {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(target_os = "windows")]
    {
        wmic_value(&["os", "get", "Caption", "/value"], "Caption")
            .unwrap_or_else(|| "windows".to_string())
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("PRETTY_NAME="))
                    .or_else(|| content.lines().find(|l| l.starts_with("VERSION_ID=")))
                    .and_then(|l| l.split_once('='))
                    .map(|(_, v)| v.trim_matches('"').to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        "unknown".to_string()
    }
}

/// Gets the machine ID (platform-specific unique identifier).
fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(target_os = "linux")]
    {
        // Try /etc/machine-id first, then /var/lib/dbus/machine-id
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
    }

    #[cfg(target_os = "windows")]
    {
        wmic_value(&["baseboard", "get", "serialnumber", "/value"], "SerialNumber")
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}

/// Gets the CPU model string.
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo").ok().and_then(|content| {
            content
                .lines()
                .find(|l| l.starts_with("model name"))
                .and_then(|l| l.split_once(':'))
                .map(|(_, v)| v.trim().to_string())
        })
    }

    #[cfg(target_os = "windows")]
    {
        wmic_value(&["cpu", "get", "ProcessorId", "/value"], "ProcessorId")
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

/// Gets the DMI product / BIOS UUID.
fn get_system_uuid() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        // Usually readable by root only
        std::fs::read_to_string("/sys/class/dmi/id/product_uuid")
            .ok()
            .map(|s| s.trim().to_string())
    }

    #[cfg(target_os = "windows")]
    {
        wmic_value(&["csproduct", "get", "uuid", "/value"], "UUID")
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

/// Reads `Key=value` from `wmic ... /value` output.
#[cfg(target_os = "windows")]
fn wmic_value(args: &[&str], key: &str) -> Option<String> {
    let output = std::process::Command::new("wmic").args(args).output().ok()?;
    let text = String::from_utf8(output.stdout).ok()?;
    let prefix = format!("{key}=");
    text.lines()
        .find_map(|l| l.trim().strip_prefix(prefix.as_str()).map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}
