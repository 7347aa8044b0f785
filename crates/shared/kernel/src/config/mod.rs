use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides (`TETHER__IAM__SESSION_TTL_SECS`).
pub const ENV_PREFIX: &str = "TETHER";
/// File used when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tether.toml";

/// Custom error type for config loading.
#[tether_derive::tether_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a TOML file. If no path is provided, it defaults to
///    `tether.toml`. The file is optional: a missing file leaves every section at its default.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `TETHER__`.
///    Nested structures are accessed using double underscores (e.g., `TETHER__VM__ENABLED` maps to `vm.enabled`).
///
/// # Errors
/// This function will return an error if:
/// * The file exists but cannot be parsed.
/// * A value (from the file or the environment) does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use tether_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, None)
}

/// Same as [`load_config`], but reads overrides from `env` instead of the process
/// environment when given. Keys keep their `TETHER__` prefix.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(env),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
