use crate::error::{ProbeError, ProbeErrorExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Executes probe commands and reads probe files.
///
/// Implementations must not kill a child when the returned future is dropped: a probe
/// chain that hits its deadline abandons in-flight work and moves on.
pub trait CommandRunner: Send + Sync + Debug {
    /// Runs `program` with `args` and returns its stdout.
    fn run(&self, program: &str, args: &[&str])
    -> impl Future<Output = Result<String, ProbeError>> + Send;

    /// Reads a text file such as `/proc/cpuinfo`.
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String, ProbeError>> + Send;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, ProbeError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .output()
            .await
            .context(format!("spawn {program}"))?;

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                message: format!("{program} exited with {}", output.status).into(),
                context: None,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn read_file(&self, path: &Path) -> Result<String, ProbeError> {
        tokio::fs::read_to_string(path).await.context(format!("read {}", path.display()))
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(String),
    Fail,
}

#[derive(Debug, Default)]
struct Script {
    commands: HashMap<String, (Scripted, Option<Duration>)>,
    files: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl Clone for Script {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            files: self.files.clone(),
            calls: Mutex::new(self.calls.lock().clone()),
        }
    }
}

/// Canned responses keyed by command line, for tests and dry runs.
///
/// Unknown commands and files fail, as a missing tool would.
#[derive(Debug, Default, Clone)]
pub struct ScriptedRunner {
    script: Arc<Script>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `command_line` (program and args joined by single spaces) with `stdout`.
    #[must_use]
    pub fn command(self, command_line: &str, stdout: impl Into<String>) -> Self {
        self.insert(command_line, Scripted::Output(stdout.into()), None)
    }

    /// Like [`ScriptedRunner::command`], but only after `delay` has elapsed.
    #[must_use]
    pub fn slow_command(self, command_line: &str, stdout: impl Into<String>, delay: Duration) -> Self {
        self.insert(command_line, Scripted::Output(stdout.into()), Some(delay))
    }

    /// Makes `command_line` exit with a failure status.
    #[must_use]
    pub fn failing_command(self, command_line: &str) -> Self {
        self.insert(command_line, Scripted::Fail, None)
    }

    #[must_use]
    pub fn file(mut self, path: &str, contents: impl Into<String>) -> Self {
        self.script_mut().files.insert(path.to_owned(), contents.into());
        self
    }

    /// Command lines and file paths requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.script.calls.lock().clone()
    }

    fn insert(mut self, command_line: &str, response: Scripted, delay: Option<Duration>) -> Self {
        self.script_mut().commands.insert(command_line.to_owned(), (response, delay));
        self
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::make_mut(&mut self.script)
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, ProbeError> {
        let line = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        self.script.calls.lock().push(line.clone());

        let Some((response, delay)) = self.script.commands.get(&line).cloned() else {
            return Err(ProbeError::Io {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "command not scripted"),
                context: Some(line.into()),
            });
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match response {
            Scripted::Output(stdout) => Ok(stdout),
            Scripted::Fail => Err(ProbeError::ExitStatus {
                message: "scripted failure".into(),
                context: Some(line.into()),
            }),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<String, ProbeError> {
        let key = path.to_string_lossy().into_owned();
        self.script.calls.lock().push(key.clone());
        self.script.files.get(&key).cloned().ok_or_else(|| ProbeError::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not scripted"),
            context: Some(key.into()),
        })
    }
}
