//! Facade over the Tether crates.
//!
//! [`Engine`] owns the record codec, the fingerprint collector, the permission store handle,
//! the VM scanner and the activation store, and exposes the boundary operations a host
//! application calls. Keep this crate thin: it composes other crates and holds no business
//! rules of its own.
//!
//! ```rust,no_run
//! use tether::Engine;
//! use tether::domain::config::TetherConfig;
//! use tether::secrets::SecretSet;
//!
//! # async fn run(config: TetherConfig, secrets: SecretSet) -> Result<(), tether::EngineError> {
//! let engine = Engine::new(config, &secrets)?;
//! if !engine.activation_status().await.is_activated() {
//!     println!("machine code: {}", engine.machine_code().await);
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;

pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineErrorExt};
pub use tether_domain as domain;
pub use tether_iam as iam;
pub use tether_kernel as kernel;
pub use tether_licensing as licensing;
pub use tether_probe as probe;
pub use tether_secrets as secrets;
pub use tether_vmscan as vmscan;

/// Build-time enabled features (by Cargo feature).
pub const FEATURES: &[&str] = &[
    "licensing",
    "iam",
    "vmscan",
    #[cfg(feature = "issuance")]
    "issuance",
];
