//! # CLI Argument Definitions
//!
//! This module defines the command-line interface (CLI) structure using the `clap` crate.
//! It specifies the available subcommands, arguments, and flags for the vendor toolkit.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tether_domain::config::RuntimeMode;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Vendor toolkit for Tether activation codes and secrets")]
pub struct Cli {
    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Issue the activation code for one machine code
    Issue {
        /// 64-character machine code reported by the device
        #[arg(short, long)]
        machine_code: String,

        #[command(flatten)]
        secrets: KeyArgs,
    },
    /// Check an activation code against a machine code
    Verify {
        /// Machine code, current (64 hex) or legacy (32 hex)
        #[arg(short, long)]
        machine_code: String,

        /// Activation code to check
        #[arg(short, long)]
        code: String,

        #[command(flatten)]
        secrets: KeyArgs,
    },
    /// Issue codes for every machine code in a file and write a CSV report
    Batch {
        /// One machine code per line. A non-hex first line is treated as a header.
        #[arg(short, long)]
        input: PathBuf,

        /// CSV destination
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        secrets: KeyArgs,
    },
    /// Generate a fresh record key and IV seed
    Keygen {},
    /// Report which secrets each source supplies and whether they agree
    CheckSecrets {
        #[command(flatten)]
        provisioning: ProvisioningArgs,
    },
}

/// Where the MAC key comes from.
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// MAC key. Overrides the provisioner chain.
    #[arg(long, env = "TETHER_XTASK_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[command(flatten)]
    pub provisioning: ProvisioningArgs,
}

/// Settings for the secret provisioner.
#[derive(Debug, Args)]
pub struct ProvisioningArgs {
    /// Runtime mode to resolve secrets for
    #[arg(long, value_enum, default_value_t = ModeArg::Development)]
    pub mode: ModeArg,

    /// Development secrets file
    #[arg(long, default_value = "secrets.local.toml")]
    pub secrets_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Production,
    Development,
    Test,
}

impl From<ModeArg> for RuntimeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Production => Self::Production,
            ModeArg::Development => Self::Development,
            ModeArg::Test => Self::Test,
        }
    }
}
