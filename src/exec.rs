//! Process execution capability.
//!
//! The mob tool, git and the summarization backend are all reached
//! through [`ProcessRunner`], so the orchestrator can be driven by an
//! in-memory runner in tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{program} not found in PATH")]
    NotFound { program: String },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {}s", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    fn spawn(program: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            ExecError::NotFound {
                program: program.to_string(),
            }
        } else {
            ExecError::Io {
                program: program.to_string(),
                source,
            }
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and return stdout. A non-zero exit is an error.
    async fn capture(&self, invocation: &Invocation) -> Result<String, ExecError>;

    /// Run attached to the terminal so the user sees the output.
    async fn passthrough(&self, invocation: &Invocation) -> Result<(), ExecError>;
}

/// Runs real processes in the project directory.
pub struct SystemRunner {
    working_dir: PathBuf,
}

impl SystemRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn command(&self, invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&self.working_dir)
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn capture(&self, invocation: &Invocation) -> Result<String, ExecError> {
        let program = invocation.program.as_str();
        debug!(program, args = ?invocation.args, dir = %self.working_dir.display(), "Running command");

        let mut command = self.command(invocation);
        command.stdin(Stdio::null());
        let output = match invocation.timeout {
            Some(timeout) => tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| ExecError::TimedOut {
                    program: program.to_string(),
                    timeout,
                })?,
            None => command.output().await,
        }
        .map_err(|e| ExecError::spawn(program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(program, stderr = %stderr, "Command failed");
            return Err(ExecError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn passthrough(&self, invocation: &Invocation) -> Result<(), ExecError> {
        let program = invocation.program.as_str();
        debug!(program, args = ?invocation.args, "Running attached command");

        let status = self
            .command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::spawn(program, e))?;

        if !status.success() {
            warn!(program, %status, "Attached command failed");
            return Err(ExecError::Failed {
                program: program.to_string(),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}
