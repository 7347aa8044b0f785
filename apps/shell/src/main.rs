#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tether::Engine;
use tether::domain::activation::ActivationStatus;
use tether::domain::config::TetherConfig;
use tether::kernel::config::load_config;
use tether::secrets::SecretProvisioner;
use tether_logger::{LevelFilter, Logger, parse_level};
use tracing::{info, warn};

/// Host shell: checks the activation of this device and activates it on request.
#[derive(Debug, Parser)]
#[command(name = "tether", version)]
struct Args {
    /// Configuration file. Defaults to `tether.toml` in the working directory.
    #[arg(long, env = "TETHER_CONFIG")]
    config: Option<PathBuf>,

    /// Activation code to apply when the device is not activated yet.
    #[arg(long)]
    activate: Option<String>,
}

#[tether_runtime::main(cooperative)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config: TetherConfig = load_config(args.config.as_deref()).context("load configuration")?;
    let _logger = init_logger(&config)?;

    let secrets = SecretProvisioner::new(config.mode, &config.secrets.dev_file)
        .initialize()
        .context("provision secrets")?;
    let engine = Engine::new(config, &secrets)?;

    if let Some(verdict) = engine.detect_vm().await {
        if verdict.is_virtual_machine {
            warn!(
                confidence = verdict.confidence,
                indicators = ?verdict.indicators,
                "Running inside a virtual machine"
            );
        } else {
            info!("No virtual machine indicators found");
        }
    }

    match engine.activation_status().await {
        ActivationStatus::Activated { algorithm } => {
            info!(%algorithm, "Device is activated");
            println!("Activated");
        },
        ActivationStatus::NotActivated { reason } => {
            info!(?reason, "Device is not activated");
            let Some(code) = args.activate else {
                println!("{}", reason.message());
                println!("Machine code: {}", engine.machine_code().await);
                return Ok(());
            };
            let response = engine.activate(&code).await;
            println!("{}", response.message);
            if !response.success {
                anyhow::bail!("activation failed");
            }
        },
    }

    Ok(())
}

fn init_logger(config: &TetherConfig) -> anyhow::Result<Logger> {
    let level = match &config.logging.level {
        Some(level) => parse_level(level)?,
        None => parse_level(config.mode.default_log_level()).unwrap_or(LevelFilter::INFO),
    };
    let builder = Logger::builder(env!("CARGO_BIN_NAME")).level(level);

    let logger = match &config.logging.directory {
        Some(dir) => builder.file(dir).json(config.logging.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
