//! hwbind: machine-bound license tool
//!
//! Covers both ends of the license exchange:
//! 1. On the licensed machine, `reqgen` writes a request and `liccheck` or
//!    `auto` validate the installed license
//! 2. At the authority, `licgen` turns a request into a license
//!
//! Usage:
//!   hwbind reqgen -o req.dat
//!   hwbind licgen -i req.dat -d 365 -c "ACME" --edition basic
//!   hwbind liccheck -l license.dat -m admission
//!
//! Key locations and defaults come from the config file, see
//! `hwbind_license::HwbindConfig`.

use std::{fs, path::{Path, PathBuf}};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hwbind_cli::{
    hardware_report, license_file_name, license_report, AutoCheck, DEFAULT_LICENSE_OUTPUT,
};
use hwbind_license::{
    CustomerInfo, FingerprintProvider, HwbindConfig, IssueOptions, LicenseEdition, LicenseIssuer,
    LicenseValidator, RequestBuilder, SystemFingerprint,
};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hwbind")]
#[command(about = "Machine-bound license requests, issuance and checks")]
struct Args {
    /// Path to the config file (default: $HWBIND_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a license request for this machine
    Reqgen {
        /// Output file
        #[arg(short, long, default_value = "req.dat")]
        output: PathBuf,

        /// Application version recorded in the request (default: from config)
        #[arg(long = "app-version")]
        app_version: Option<String>,
    },

    /// Issue a license from a request (needs the authority private key)
    Licgen {
        /// Request file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; the default is renamed after customer, machine and date
        #[arg(short, long, default_value = DEFAULT_LICENSE_OUTPUT)]
        output: PathBuf,

        /// Validity in days (default: from config)
        #[arg(short, long)]
        days: Option<i64>,

        /// Customer name
        #[arg(short, long, default_value = "")]
        customer: String,

        /// Customer organization
        #[arg(long, default_value = "")]
        org: String,

        /// Edition: basic (b) or enterprise (e) (default: from config)
        #[arg(long)]
        edition: Option<LicenseEdition>,
    },

    /// Validate a license file and print its terms
    Liccheck {
        /// License file (default: from config)
        #[arg(short, long)]
        license: Option<PathBuf>,

        /// Only check that this module is authorized
        #[arg(short, long)]
        module: Option<String>,
    },

    /// Print this machine's fingerprint
    Hwinfo,

    /// Check the installed license, writing a new request if needed
    Auto {
        /// Module that must be authorized
        #[arg(short, long)]
        module: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = load_config(args.config.as_deref())?;
    let provider = SystemFingerprint;

    match args.command {
        Command::Reqgen { output, app_version } => {
            reqgen(&config, &provider, &output, app_version)
        }
        Command::Licgen {
            input,
            output,
            days,
            customer,
            org,
            edition,
        } => {
            let options = IssueOptions {
                days: days.unwrap_or_else(|| i64::from(config.default_days)),
                customer: CustomerInfo {
                    name: customer,
                    org,
                },
                edition: edition.unwrap_or(config.default_edition),
            };
            licgen(&config, &input, &output, &options)
        }
        Command::Liccheck { license, module } => {
            let path = license.unwrap_or_else(|| config.license_path.clone());
            liccheck(&config, &provider, &path, module.as_deref())
        }
        Command::Hwinfo => {
            println!("{}", hardware_report(&provider));
            Ok(())
        }
        Command::Auto { module } => {
            let check = AutoCheck::new(
                config.authority_public_key()?,
                provider,
                config.license_path.clone(),
                config.request_path.clone(),
            )
            .app_version(config.app_version.clone());
            let validated = check.run(module.as_deref())?;
            println!("License valid");
            println!("{}", license_report(&validated, chrono::Utc::now().timestamp()));
            Ok(())
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<HwbindConfig> {
    if let Some(path) = explicit {
        return HwbindConfig::load(path).context("Failed to load config");
    }
    if let Some(path) = std::env::var_os("HWBIND_CONFIG") {
        return HwbindConfig::load(Path::new(&path)).context("Failed to load config");
    }
    match HwbindConfig::default_path() {
        Some(path) => HwbindConfig::load_or_default(&path).context("Failed to load config"),
        None => {
            debug!("No config directory, using defaults");
            Ok(HwbindConfig::default())
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

fn reqgen(
    config: &HwbindConfig,
    provider: &dyn FingerprintProvider,
    output: &Path,
    app_version: Option<String>,
) -> Result<()> {
    let authority = config.authority_public_key()?;
    ensure_parent(output)?;

    let fingerprint = provider.fingerprint();
    let machine_info = provider.machine_info();
    info!("Hardware fingerprint: {}", fingerprint);
    info!("Machine: {}", machine_info);

    let token = RequestBuilder::new(&authority, fingerprint)
        .version(app_version.unwrap_or_else(|| config.app_version.clone()))
        .machine_info(machine_info)
        .build()
        .context("Failed to build license request")?;
    fs::write(output, token)
        .with_context(|| format!("Failed to write request {}", output.display()))?;

    println!("Request written to {}", output.display());
    println!("Send this file to the license authority to obtain a license.");
    Ok(())
}

fn licgen(
    config: &HwbindConfig,
    input: &Path,
    output: &Path,
    options: &IssueOptions,
) -> Result<()> {
    let issuer = LicenseIssuer::new(config.authority_key_pair()?);
    let token = fs::read_to_string(input)
        .with_context(|| format!("Failed to read request {}", input.display()))?;

    info!("Issuing {} license for {} days", options.edition, options.days);
    let license = issuer
        .issue(&token, options)
        .with_context(|| format!("Failed to issue license from {}", input.display()))?;

    let output = if output == Path::new(DEFAULT_LICENSE_OUTPUT) {
        output.with_file_name(license_file_name(
            input,
            options.edition,
            &options.customer.name,
            chrono::Local::now().date_naive(),
        ))
    } else {
        output.to_path_buf()
    };
    ensure_parent(&output)?;
    fs::write(&output, license)
        .with_context(|| format!("Failed to write license {}", output.display()))?;

    println!("License written to {}", output.display());
    println!("Modules:");
    for module in options.edition.modules() {
        println!("  {module}");
    }
    Ok(())
}

fn liccheck(
    config: &HwbindConfig,
    provider: &dyn FingerprintProvider,
    path: &Path,
    module: Option<&str>,
) -> Result<()> {
    let validator = LicenseValidator::new(config.authority_public_key()?);
    let fingerprint = provider.fingerprint();
    println!("Checking license {}", path.display());
    println!("Hardware fingerprint: {fingerprint}");

    let validated = validator
        .validate_file(path, &fingerprint)
        .context("License validation failed")?;

    if let Some(module) = module {
        validated
            .require_module(module)
            .context("Module authorization check failed")?;
        println!("Module '{module}' is authorized");
        return Ok(());
    }

    println!("License valid\n");
    println!("{}", license_report(&validated, chrono::Utc::now().timestamp()));
    Ok(())
}
