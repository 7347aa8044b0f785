use crate::models::args::ProvisioningArgs;
use anyhow::{Context, bail};
use tether_secrets::{EntryState, SecretKind, SecretProvisioner, generate_keys};

/// Prints a fresh record key and IV seed in every form the provisioner accepts.
///
/// # Errors
/// Returns an error if the system RNG is unavailable.
pub fn keygen() -> anyhow::Result<()> {
    let keys = generate_keys()?;

    println!("Encryption key (32 bytes): {}", keys.encryption_key);
    println!("IV seed (16 bytes): {}", keys.encryption_iv);
    println!();
    println!("# Runtime environment");
    println!("{}={}", SecretKind::EncryptionKey.env_var(), keys.encryption_key);
    println!("{}={}", SecretKind::IvSeed.env_var(), keys.encryption_iv);
    println!();
    println!("# Build-time embedding");
    println!("{}={}", SecretKind::EncryptionKey.embedded_var(), keys.encryption_key);
    println!("{}={}", SecretKind::IvSeed.embedded_var(), keys.encryption_iv);

    Ok(())
}

/// Prints a per-source report and fails when the sources disagree.
///
/// In production mode the secrets must also be production ready.
///
/// # Errors
/// Returns an error on inconsistent secrets, an unparsable development file, or a
/// production set that is not ready.
pub fn check_secrets(args: &ProvisioningArgs) -> anyhow::Result<()> {
    let provisioner = SecretProvisioner::new(args.mode.into(), &args.secrets_file);
    let report = provisioner.inspect().context("Failed to inspect secret sources")?;

    println!("Mode: {}", report.mode);
    for source in &report.sources {
        println!("\n[{}]", source.source.as_str());
        for kind in SecretKind::ALL {
            let state = match source.state(kind) {
                EntryState::Absent => "absent".to_owned(),
                EntryState::Valid => "valid".to_owned(),
                EntryState::NonStandard(detail) => format!("non-standard: {detail}"),
                EntryState::Invalid(detail) => format!("invalid: {detail}"),
            };
            println!("  {:<28} {state}", kind.env_var());
        }
    }

    let status = provisioner.status();
    println!();
    for (kind, source) in [
        (SecretKind::MacKey, status.mac_key_source),
        (SecretKind::EncryptionKey, status.encryption_key_source),
        (SecretKind::IvSeed, status.iv_seed_source),
    ] {
        let source = source.map_or("unresolved", |s| s.as_str());
        println!("{:<28} resolved from {source}", kind.env_var());
    }

    let production_ready = report.is_production_ready();
    println!("\nProduction ready: {}", if production_ready { "yes" } else { "no" });

    if !report.is_consistent() {
        let conflicts =
            report.conflicts.iter().map(|k| k.env_var()).collect::<Vec<_>>().join(", ");
        if conflicts.is_empty() {
            bail!("Secrets are inconsistent: a source supplies an undecodable value");
        }
        bail!("Secrets are inconsistent: sources disagree on {conflicts}");
    }
    if report.mode.is_production() && !production_ready {
        bail!("Secrets are not production ready");
    }

    println!("All secrets are consistent");
    Ok(())
}
