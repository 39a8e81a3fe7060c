// ABOUTME: Fatal error types for deploy-verify.
// ABOUTME: Every variant aborts the run and maps to the fatal exit status.

use crate::compose::Stage;
use crate::process::CommandError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a run aborted by a fatal precondition.
pub const EXIT_FATAL: i32 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("no service manifest found in {0}")]
    ManifestNotFound(PathBuf),

    #[error("missing required tool(s): {}", .0.join(", "))]
    MissingTool(Vec<String>),

    #[error("failed to install {tool}: {reason}")]
    ToolInstallFailed { tool: String, reason: String },

    #[error("port(s) already in use: {}", .0.join(", "))]
    PortConflict(Vec<String>),

    #[error("orchestration {stage} failed: {source}")]
    Orchestration {
        stage: Stage,
        #[source]
        source: CommandError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }
}

pub type Result<T> = std::result::Result<T, Error>;
