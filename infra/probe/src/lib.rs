//! # Probe
//!
//! Collects the raw hardware identity of the current device.
//!
//! The adapter MAC is read synchronously. CPU, baseboard and disk identifiers are probed
//! one after another through a [`CommandRunner`], each with its platform-specific fallbacks,
//! under a single deadline. Whatever resolved before the deadline is kept and the rest is
//! replaced with the `UNKNOWN_*` sentinels, so collection never fails.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tether_probe::FingerprintCollector;
//!
//! # async fn run() {
//! let collector = FingerprintCollector::system(Duration::from_secs(5));
//! let fingerprint = collector.collect().await;
//! println!("{}", fingerprint.canonical());
//! # }
//! ```

mod collector;
mod error;
mod mac;
pub mod parse;
mod platform;
mod probes;
mod runner;

pub use collector::{Collection, FingerprintCollector};
pub use error::{ProbeError, ProbeErrorExt};
pub use mac::{format_mac, primary_mac};
pub use platform::Platform;
pub use runner::{CommandRunner, ScriptedRunner, SystemRunner};
