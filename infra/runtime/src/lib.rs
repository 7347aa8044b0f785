//! # Runtime
//!
//! Tokio bootstrap shared by every binary in the workspace.
//!
//! The licensing core is written for a single cooperative thread: hardware probes, the VM scan
//! and the permission actor interleave on it. [`RuntimeConfig::cooperative`] is therefore the
//! default, and a work-stealing pool is opt-in.
//!
//! [`run`] blocks on the entry future and then shuts the runtime down with a bounded grace
//! period, so a probe subprocess that never answers cannot keep the process alive.
//!
//! ```rust,ignore
//! #[tether_runtime::main(cooperative)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use tether_derive::main;

use std::future::Future;
use std::io;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const MAX_WORKERS: usize = 64;
const FALLBACK_WORKERS: usize = 2;
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const DEFAULT_THREAD_NAME: &str = "tether";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Everything runs on the thread that calls [`run`].
    CurrentThread,
    MultiThread { workers: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub flavor: Flavor,
    /// Names the blocking-pool threads (and workers on a multi-thread runtime).
    pub thread_name: String,
    /// How long [`run`] waits for leftover tasks after the entry future returns.
    pub shutdown_grace: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::cooperative()
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn cooperative() -> Self {
        Self {
            flavor: Flavor::CurrentThread,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// One worker per available core.
    #[must_use]
    pub fn multi_thread() -> Self {
        let workers = available_parallelism().map_or(FALLBACK_WORKERS, std::num::NonZero::get);
        Self::cooperative().with_workers(workers)
    }

    /// Switches to a multi-thread runtime. The count is clamped to `1..=64`.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.flavor = Flavor::MultiThread { workers: workers.clamp(1, MAX_WORKERS) };
        self
    }

    /// Blank names are ignored.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.thread_name = name;
        }
        self
    }

    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Builds a runtime with the I/O and time drivers enabled.
///
/// # Errors
/// Returns the OS error when threads or the I/O driver cannot be created.
pub fn build_runtime(config: &RuntimeConfig) -> io::Result<Runtime> {
    debug!(flavor = ?config.flavor, thread_name = %config.thread_name, "Building runtime");

    let mut builder = match config.flavor {
        Flavor::CurrentThread => Builder::new_current_thread(),
        Flavor::MultiThread { workers } => {
            let mut builder = Builder::new_multi_thread();
            builder.worker_threads(workers);
            builder
        },
    };
    builder.thread_name(config.thread_name.as_str()).enable_all().build()
}

/// Drives `entry` to completion, then shuts down within `config.shutdown_grace`.
///
/// # Errors
/// Runtime construction failures convert into `E`; otherwise the entry future's own result.
pub fn run<F, T, E>(config: &RuntimeConfig, entry: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<io::Error>,
{
    let runtime = build_runtime(config)?;
    let outcome = runtime.block_on(entry);
    runtime.shutdown_timeout(config.shutdown_grace);
    outcome
}
