use crate::models::args::KeyArgs;
use anyhow::{Context, bail};
use std::fs;
use std::path::Path;
use tether_domain::machine::MachineCode;
use tether_licensing::LicenseError;
use tether_licensing::issuance::{BatchSummary, issue_batch, parse_batch_input, render_csv};
use tether_secrets::{SecretKind, SecretProvisioner};

/// Runs `f` with the MAC key from `--secret-key`, or from the provisioner chain.
fn with_mac_key<T>(args: &KeyArgs, f: impl FnOnce(&[u8]) -> anyhow::Result<T>) -> anyhow::Result<T> {
    if let Some(key) = &args.secret_key {
        if key.is_empty() {
            bail!("--secret-key must not be empty");
        }
        return f(key.as_bytes());
    }

    let provisioning = &args.provisioning;
    let secrets = SecretProvisioner::new(provisioning.mode.into(), &provisioning.secrets_file)
        .initialize()
        .context("Failed to resolve the MAC key")?;
    eprintln!("Using MAC key from {}", secrets.source(SecretKind::MacKey).as_str());
    f(secrets.mac_key())
}

/// Prints the activation code for `machine_code`.
///
/// # Errors
/// Returns an error for a malformed or legacy machine code, or when no MAC key is available.
pub fn issue(machine_code: &str, args: &KeyArgs) -> anyhow::Result<()> {
    let machine_code = MachineCode::parse(machine_code).context("Invalid machine code")?;

    let code = with_mac_key(args, |key| Ok(tether_licensing::issue(&machine_code, key)?))?;
    println!("{code}");

    Ok(())
}

/// Checks `code` against `machine_code`.
///
/// # Errors
/// Returns an error when the code is invalid, naming whether the format or the MAC failed.
pub fn verify(machine_code: &str, code: &str, args: &KeyArgs) -> anyhow::Result<()> {
    let machine_code = MachineCode::parse(machine_code).context("Invalid machine code")?;

    with_mac_key(args, |key| match tether_licensing::verify(code.trim(), &machine_code, key) {
        Ok(()) => {
            println!("valid ({})", machine_code.algorithm());
            Ok(())
        },
        Err(e @ (LicenseError::Format { .. } | LicenseError::Mismatch { .. })) => {
            println!("invalid ({})", e.code());
            bail!(e)
        },
        Err(e) => Err(e.into()),
    })
}

/// Issues a code for every machine code listed in `input` and writes the CSV report.
///
/// Failed rows are reported in the CSV and do not abort the batch.
///
/// # Errors
/// Returns an error if a file cannot be read or written, or when no MAC key is available.
pub fn batch(input: &Path, output: &Path, args: &KeyArgs) -> anyhow::Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let machine_codes = parse_batch_input(&content);
    if machine_codes.is_empty() {
        bail!("No machine codes found in {}", input.display());
    }

    let entries = with_mac_key(args, |key| Ok(issue_batch(machine_codes.as_slice(), key)))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, render_csv(&entries))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let summary = BatchSummary::of(&entries);
    println!(
        "Processed {} machine codes: {} succeeded, {} failed",
        summary.total, summary.succeeded, summary.failed
    );
    println!("Results saved to {}", output.display());

    Ok(())
}
