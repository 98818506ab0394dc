//! Shell runner - executes command lines captured or detached
//!
//! Command lines handed to [`ShellRunner::run`] and
//! [`ShellRunner::spawn_detached`] are passed verbatim to `<shell> -c`.
//! Callers interpolate user-supplied strings into them without escaping, so
//! any tool argument can inject shell syntax. This is a known weakness of the
//! tool surface.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::ToolError;
use crate::config::ShellConfig;

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run a command line through the shell and wait for it to exit
    pub async fn run(&self, command_line: &str) -> Result<CommandOutput, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c").arg(command_line);
        self.capture(cmd, command_line).await
    }

    /// Run a program directly with an argument vector, no shell involved
    pub async fn run_argv(&self, program: &str, args: &[String]) -> Result<CommandOutput, ToolError> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        let display = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.capture(cmd, &display).await
    }

    /// Spawn a command line in its own process group and return immediately
    ///
    /// The child is never awaited; tokio reaps it once it exits. Returns the
    /// child's pid when the platform reports one.
    pub fn spawn_detached(&self, command_line: &str) -> Result<Option<u32>, ToolError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Keep the child alive when the server's process group gets a SIGINT
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| ToolError::Spawn {
            command: command_line.to_string(),
            source,
        })?;

        Ok(child.id())
    }

    async fn capture(&self, mut cmd: Command, display: &str) -> Result<CommandOutput, ToolError> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("Running: {}", display);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| ToolError::Timeout {
                    command: display.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })?,
            None => cmd.output().await,
        }
        .map_err(|source| ToolError::Spawn {
            command: display.to_string(),
            source,
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
