use crate::permissions::UnknownActionPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Deployment mode. Production disables every insecure fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Production,
    #[default]
    Development,
    Test,
}

impl RuntimeMode {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Log level used when `logging.level` is not set.
    #[must_use]
    pub const fn default_log_level(self) -> &'static str {
        match self {
            Self::Production => "warn",
            Self::Development => "debug",
            Self::Test => "info",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level engine configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TetherConfigInner {
    pub mode: RuntimeMode,
    pub storage: StorageConfig,
    pub hardware: HardwareConfig,
    pub iam: IamConfig,
    pub vm: VmConfig,
    pub secrets: SecretsConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct TetherConfig {
    #[serde(flatten, default)]
    inner: Arc<TetherConfigInner>,
}

impl Deref for TetherConfig {
    type Target = TetherConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for TetherConfig {
    fn deref_mut(&mut self) -> &mut TetherConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Where persisted state lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub activation_file: String,
    pub permissions_file: String,
}

impl StorageConfig {
    #[must_use]
    pub fn activation_path(&self) -> PathBuf {
        self.data_dir.join(&self.activation_file)
    }

    #[must_use]
    pub fn permissions_path(&self) -> PathBuf {
        self.data_dir.join(&self.permissions_file)
    }
}

/// Fingerprint collection knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Deadline for the whole probe chain, in milliseconds.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IamConfig {
    pub session_ttl_secs: u64,
    pub unknown_action: UnknownActionPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Unversioned TOML file consulted outside production.
    pub dev_file: PathBuf,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Overrides the mode-derived level when set.
    pub level: Option<String>,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            activation_file: "activation.json".to_owned(),
            permissions_file: "permissions.json".to_owned(),
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

impl Default for IamConfig {
    fn default() -> Self {
        Self { session_ttl_secs: 3_600, unknown_action: UnknownActionPolicy::Allow }
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { dev_file: PathBuf::from("secrets.local.toml") }
    }
}
