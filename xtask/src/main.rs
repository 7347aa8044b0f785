#![warn(rust_2018_idioms, unused_lifetimes)]
#![allow(
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::disallowed_methods,
    clippy::disallowed_types
)]

pub mod handlers;
pub mod models;

use crate::handlers::{license, secrets};
use crate::models::args::{AppCommands, Cli};

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        AppCommands::Issue { machine_code, secrets } => license::issue(&machine_code, &secrets)?,
        AppCommands::Verify { machine_code, code, secrets } => {
            license::verify(&machine_code, &code, &secrets)?;
        },
        AppCommands::Batch { input, output, secrets } => license::batch(&input, &output, &secrets)?,
        AppCommands::Keygen {} => secrets::keygen()?,
        AppCommands::CheckSecrets { provisioning } => secrets::check_secrets(&provisioning)?,
    }

    Ok(())
}
