//! # Logger
//!
//! Process-wide `tracing` setup for the shell and the vendor tools.
//!
//! A [`LoggerBuilder`] starts console-only. Calling `file` moves it into the
//! [`WithFile`] state, which is the only state where rotation, retention and JSON output can be
//! set. Filter precedence, highest first:
//!
//! 1. `RUST_LOG`, when set and non-empty.
//! 2. Directives given to [`LoggerBuilder::env_filter`].
//! 3. The [`LoggerBuilder::level`] default.
//!
//! ```rust
//! # use tether_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder("tether")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod file;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use crate::file::{FileFormat, FileSink};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Builder state: console output only.
#[derive(Debug, Default)]
pub struct ConsoleOnly;

/// Builder state: console plus a rolling file sink.
#[derive(Debug)]
pub struct WithFile(FileSink);

#[derive(Debug)]
struct Settings {
    name: String,
    level: LevelFilter,
    directives: Option<String>,
    console: bool,
    ansi: bool,
}

#[must_use = "a logger builder does nothing until `init` is called"]
#[derive(Debug)]
pub struct LoggerBuilder<O = ConsoleOnly> {
    settings: Settings,
    output: O,
}

impl<O> LoggerBuilder<O> {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Module directives such as `tether_iam=debug,tether_probe=trace`.
    /// Invalid directives make `init` fail.
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.settings.directives = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.settings.ansi = enabled;
        self
    }
}

impl LoggerBuilder<ConsoleOnly> {
    /// Adds daily rolling files under `dir`, named after the logger.
    pub fn file(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithFile> {
        LoggerBuilder { settings: self.settings, output: WithFile(FileSink::new(dir.into())) }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, bad directives or a disabled
    /// console. [`LoggerError::Subscriber`] when a subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        install(self.settings, None)
    }
}

impl LoggerBuilder<WithFile> {
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.output.0.rotation = rotation;
        self
    }

    /// Number of rotated files kept on disk.
    pub const fn max_files(mut self, count: usize) -> Self {
        self.output.0.retention = count;
        self
    }

    /// One JSON object per line in the file sink. The console stays human readable.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.output.0.format = if enabled { FileFormat::Json } else { FileFormat::Text };
        self
    }

    /// Installs the global subscriber and starts the file writer.
    ///
    /// Keep the returned [`Logger`] alive until shutdown; dropping it stops the writer.
    ///
    /// # Errors
    /// Same as the console-only `init`, plus [`LoggerError::Io`] and
    /// [`LoggerError::Appender`] when the directory or appender cannot be set up, and
    /// [`LoggerError::InvalidConfiguration`] for zero retention.
    pub fn init(self) -> Result<Logger, LoggerError> {
        install(self.settings, Some(self.output.0))
    }
}

fn install(settings: Settings, sink: Option<FileSink>) -> Result<Logger, LoggerError> {
    if settings.name.trim().is_empty() {
        return Err(invalid("logger name cannot be empty"));
    }
    if !settings.console && sink.is_none() {
        return Err(invalid("no output enabled, turn on the console or add a file"));
    }
    if let Some(sink) = &sink {
        sink.validate()?;
    }
    let filter = build_filter(settings.level, settings.directives.as_deref())?;

    let mut layers = Vec::with_capacity(2);
    if settings.console {
        layers.push(layer().compact().with_ansi(settings.ansi).boxed());
    }

    let mut guard = None;
    if let Some(sink) = &sink {
        let (writer, worker) = sink.open(&settings.name)?;
        let file_layer = layer().with_writer(writer).with_ansi(false);
        layers.push(match sink.format {
            FileFormat::Json => file_layer.json().boxed(),
            FileFormat::Text => file_layer.boxed(),
        });
        guard = Some(worker);
    }

    tracing_subscriber::registry().with(filter).with(layers).try_init()?;

    Ok(Logger { directory: sink.map(|s| s.dir().to_path_buf()), _guard: guard })
}

/// Handle to the installed subscriber.
#[must_use = "dropping the logger stops the background file writer"]
#[derive(Debug)]
pub struct Logger {
    directory: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a console-only builder. `name` also prefixes rolled files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            settings: Settings {
                name: name.into(),
                level: LevelFilter::INFO,
                directives: None,
                console: true,
                ansi: true,
            },
            output: ConsoleOnly,
        }
    }

    /// Directory of the file sink, when one is active.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.directory.is_some() {
            tracing::debug!("Flushing log files");
        }
    }
}

/// Parses `"warn"`, `" DEBUG "`, `"off"` and friends.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown level names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|e| invalid(format!("unknown log level '{level}': {e}")))
}

fn build_filter(level: LevelFilter, directives: Option<&str>) -> Result<EnvFilter, LoggerError> {
    let base = || EnvFilter::builder().with_default_directive(level.into());

    let programmatic = match directives {
        Some(directives) => base()
            .parse(directives)
            .map_err(|e| invalid(format!("invalid filter '{directives}': {e}")))?,
        None => base().parse_lossy(""),
    };

    Ok(match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => base().parse_lossy(from_env),
        _ => programmatic,
    })
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn builder_starts_console_only() {
        let builder = Logger::builder("tether").env_filter("tether=debug");
        assert!(builder.settings.console);
        assert!(builder.settings.ansi);
        assert_eq!(builder.settings.level, LevelFilter::INFO);
        assert_eq!(builder.settings.directives.as_deref(), Some("tether=debug"));
    }

    #[test]
    fn file_state_carries_sink_settings() {
        let builder = Logger::builder("tether")
            .console(false)
            .level(LevelFilter::DEBUG)
            .file("/var/log/tether")
            .max_files(5)
            .rotation(Rotation::HOURLY)
            .json(true);

        assert!(!builder.settings.console);
        assert_eq!(builder.settings.level, LevelFilter::DEBUG);
        let sink = &builder.output.0;
        assert_eq!(sink.dir(), Path::new("/var/log/tether"));
        assert_eq!(sink.retention, 5);
        assert_eq!(sink.format, FileFormat::Json);
    }

    #[test]
    #[serial]
    fn invalid_settings_fail_before_install() {
        let err = Logger::builder("  ").init().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");

        let err = Logger::builder("quiet").console(false).init().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");

        let err = Logger::builder("keep-none").file("logs").max_files(0).init().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");

        let err = Logger::builder("bad-filter").env_filter("tether=loud").init().unwrap_err();
        assert_eq!(err.code(), "invalid_configuration");
    }

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(parse_level("loud").is_err());
    }
}
