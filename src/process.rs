// ABOUTME: External command execution with timeouts.
// ABOUTME: Shared by the orchestration driver and the tool installer.

use snafu::{ResultExt, Snafu};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Failure to run an external command to a successful exit.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CommandError {
    #[snafu(display("failed to run `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` timed out after {}s", timeout.as_secs()))]
    Timeout { command: String, timeout: Duration },

    #[snafu(display("`{command}` exited with {}: {}", exit_label(*exit_code), stderr.trim()))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("unexpected output from `{command}`: {source}"))]
    Parse {
        command: String,
        source: serde_json::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    code.map(|c| format!("status {c}"))
        .unwrap_or_else(|| "a signal".to_string())
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The program could not be started (usually not on PATH).
    NotRunnable,
    /// The program did not finish within its timeout.
    TimedOut,
    /// The program exited unsuccessfully.
    NonZeroExit,
    /// The program succeeded but printed something unparseable.
    BadOutput,
}

impl CommandError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> CommandErrorKind {
        match self {
            CommandError::Spawn { .. } => CommandErrorKind::NotRunnable,
            CommandError::Timeout { .. } => CommandErrorKind::TimedOut,
            CommandError::Failed { .. } => CommandErrorKind::NonZeroExit,
            CommandError::Parse { .. } => CommandErrorKind::BadOutput,
        }
    }
}

/// Render a command line for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program args...` in `cwd`, failing on spawn errors, timeout, or non-zero exit.
pub async fn run(
    program: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let command = display_command(program, args);
    tracing::debug!("Running `{}`", command);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.context(SpawnSnafu {
            command: command.clone(),
        })?,
        Err(_) => return TimeoutSnafu { command, timeout }.fail(),
    };

    let output = CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !output.success() {
        return FailedSnafu {
            command,
            exit_code: output.exit_code,
            stderr: output.stderr,
        }
        .fail();
    }

    Ok(output)
}
