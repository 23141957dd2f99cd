//! Subprocess and logging plumbing shared across the crate.

use eyre::{Result, WrapErr};
use std::process::{Command, Output};
use tracing_subscriber::EnvFilter;

/// Initializes a tracing subscriber from the `RUST_LOG` environment variable.
pub fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// An external command that exited unsuccessfully.
///
/// Carries the child's status and diagnostic output so the driver can report
/// the collaborator's message and exit with its exact code.
#[derive(Debug, thiserror::Error)]
#[error("`{program}` failed ({status})\n{stderr}")]
pub struct CommandError {
    pub program: String,
    pub status: std::process::ExitStatus,
    pub stderr: String,
}

impl CommandError {
    /// The child's exit code, defaulting to 1 when it was killed by a signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(1)
    }
}

/// Extension trait for [`Command`] that turns non-zero exits into errors.
pub trait CommandUtils {
    /// Runs the command to completion and returns its output.
    ///
    /// A command that cannot be spawned or exits with a non-zero status
    /// becomes an error wrapping a [`CommandError`].
    fn exec(&mut self) -> Result<Output>;

    /// Runs the command and returns its trimmed stdout.
    fn get_stdout_lossy(&mut self) -> Result<String>;
}

impl CommandUtils for Command {
    fn exec(&mut self) -> Result<Output> {
        trace!(command = ?self, "executing");
        let program = self.get_program().to_string_lossy().into_owned();
        let output = self.output().wrap_err_with(|| format!("failed to spawn `{program}`"))?;
        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(CommandError { program, status: output.status, stderr }.into())
        }
    }

    fn get_stdout_lossy(&mut self) -> Result<String> {
        let output = self.exec()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
