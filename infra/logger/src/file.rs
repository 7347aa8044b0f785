use crate::error::{LoggerError, LoggerErrorExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const DEFAULT_RETENTION: usize = 10;
const SUFFIX: &str = "log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum FileFormat {
    #[default]
    Text,
    Json,
}

/// Rolling file output. Files are named `<prefix>.<date>.log`.
#[derive(Debug, Clone)]
pub(crate) struct FileSink {
    pub(crate) dir: PathBuf,
    pub(crate) rotation: Rotation,
    pub(crate) retention: usize,
    pub(crate) format: FileFormat,
}

impl FileSink {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir, rotation: Rotation::DAILY, retention: DEFAULT_RETENTION, format: FileFormat::Text }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn validate(&self) -> Result<(), LoggerError> {
        if self.retention == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "at least one log file must be retained".into(),
                context: None,
            });
        }
        Ok(())
    }

    /// Creates the directory and starts the background writer thread.
    pub(crate) fn open(&self, prefix: &str) -> Result<(NonBlocking, WorkerGuard), LoggerError> {
        fs::create_dir_all(&self.dir)
            .context(format!("Creating log directory {}", self.dir.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(prefix)
            .filename_suffix(SUFFIX)
            .max_log_files(self.retention)
            .build(&self.dir)?;

        Ok(tracing_appender::non_blocking(appender))
    }
}
