//! # VM Scan
//!
//! Heuristic detection of virtualized hosts. Platform probes and resource checks produce a
//! set of indicator tags, each tag has a weight, and the capped sum is the confidence.
//!
//! The result is advisory. It is logged at start-up and never blocks anything.

mod scanner;
pub mod signals;
mod weights;

pub use scanner::{HostResources, VmScanner};
pub use weights::{confidence, verdict, weight};
