//! Process launching
//!
//! [`ProcessLauncher`] is the seam between command construction and the
//! operating system. [`TokioLauncher`] is the real implementation; tests
//! substitute a recording launcher.

use std::io;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::command::ParatestCommand;

/// How a child process ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when the child was killed by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    #[cfg(test)]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a built command to completion
#[allow(async_fn_in_trait)]
pub trait ProcessLauncher {
    async fn launch(&self, command: &ParatestCommand) -> io::Result<ExitOutcome>;
}

/// Launches the runner with `tokio::process`, streaming its output
#[derive(Clone, Debug, Default)]
pub struct TokioLauncher;

impl TokioLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioLauncher {
    async fn launch(&self, command: &ParatestCommand) -> io::Result<ExitOutcome> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let status = cmd.status().await?;
        debug!("{} exited with {}", command.program.display(), status);

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}
