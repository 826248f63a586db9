//! Abstraction over shell command execution for testability.
//!
//! Every external step of provisioning (git, rbenv, gem) is composed as a
//! single shell string and handed to a [`CommandRunner`]. The trait has one
//! required method, [`execute`](CommandRunner::execute), which reports the
//! exit code without judging it. The provided helpers layer the failure
//! policy on top:
//!
//! - [`run`](CommandRunner::run): non-zero exit becomes
//!   [`ProvisionError::CommandFailed`]
//! - [`capture`](CommandRunner::capture): same, returning the output with
//!   trailing whitespace trimmed
//!
//! # Production Usage
//!
//! [`ShellCommandRunner`] runs commands through `bash -c` and streams their
//! output to the sink while they run.
//!
//! # Testing Usage
//!
//! [`MockCommandRunner`](crate::testing::MockCommandRunner), behind the
//! `test-support` feature, records all calls and returns canned responses,
//! enabling fast, deterministic tests without rbenv or git installed.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ProvisionError, Result};

/// Exit code and output of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub captured_output: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for abstracting shell command execution.
///
/// Stored as `Arc<dyn CommandRunner>` by the
/// [`Provisioner`](crate::provision::Provisioner).
pub trait CommandRunner: Send + Sync {
    /// Run `command` through a shell, writing its output to `sink` as it is
    /// produced. A non-zero exit code is returned, not treated as an error.
    ///
    /// Pass `&mut std::io::sink()` to discard output.
    fn execute(&self, command: &str, sink: &mut dyn Write) -> Result<i32>;

    /// Run `command` into a private buffer and return both exit code and text.
    fn execute_captured(&self, command: &str) -> Result<ExecutionResult> {
        let mut buffer = Vec::new();
        let exit_code = self.execute(command, &mut buffer)?;
        Ok(ExecutionResult {
            exit_code,
            captured_output: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }

    /// Run `command`, failing with [`ProvisionError::CommandFailed`] on
    /// non-zero exit.
    fn run(&self, command: &str, sink: &mut dyn Write) -> Result<()> {
        let exit_code = self.execute(command, sink)?;
        check_exit(command, exit_code)
    }

    /// Run `command` and return its output with trailing whitespace trimmed.
    fn capture(&self, command: &str) -> Result<String> {
        let result = self.execute_captured(command)?;
        check_exit(command, result.exit_code)?;
        Ok(result.captured_output.trim_end().to_string())
    }
}

fn check_exit(command: &str, exit_code: i32) -> Result<()> {
    if exit_code == 0 {
        Ok(())
    } else {
        Err(ProvisionError::CommandFailed {
            command: command.to_string(),
            exit_code,
        })
    }
}

/// Shell-quote a single argument for interpolation into a command string.
pub fn quote(arg: &str) -> Result<Cow<'_, str>> {
    shlex::try_quote(arg).map_err(|_| ProvisionError::UnquotableArgument {
        value: arg.to_string(),
    })
}

/// Shell-quote a path. Paths that are not valid UTF-8 are rejected rather
/// than rewritten, so commands always name the path on disk.
pub fn quote_path(path: &Path) -> Result<Cow<'_, str>> {
    let text = path
        .to_str()
        .ok_or_else(|| ProvisionError::UnquotableArgument {
            value: path.to_string_lossy().into_owned(),
        })?;
    quote(text)
}

/// Production implementation that runs commands via `bash -c`.
///
/// stderr is folded into stdout so the sink sees both streams in order.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: String,
}

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }

    /// Use a different shell binary (must accept `-c`).
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellCommandRunner {
    fn execute(&self, command: &str, sink: &mut dyn Write) -> Result<i32> {
        debug!(command, shell = %self.shell, "Running command");
        let spawn_error = |source: io::Error| ProvisionError::Spawn {
            command: command.to_string(),
            source,
        };

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(format!("exec 2>&1\n{command}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdout) = child.stdout.take() {
            if let Err(err) = io::copy(&mut stdout, sink) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        }

        let status = child.wait().map_err(spawn_error)?;
        // Killed by a signal: no code, report as a generic failure.
        let exit_code = status.code().unwrap_or(1);
        debug!(command, exit_code, "Command completed");
        Ok(exit_code)
    }
}
