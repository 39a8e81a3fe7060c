// ABOUTME: Orchestration driver: builds, starts, lists and inspects compose services.
// ABOUTME: The Orchestrator trait is the seam between the verifier and the external CLI.

mod cli;
mod manifest;

pub use cli::ComposeCli;
pub use manifest::{MANIFEST_FILENAMES, Manifest};

use crate::process::CommandError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operations the verifier needs from the orchestration tool.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Build images for every service in the manifest.
    async fn build(&self, manifest: &Manifest) -> Result<(), CommandError>;

    /// Start the composed services detached.
    async fn up(&self, manifest: &Manifest) -> Result<(), CommandError>;

    /// List images known to the container runtime.
    async fn images(&self) -> Result<Vec<ImageSummary>, CommandError>;

    /// List running containers.
    async fn containers(&self) -> Result<Vec<ContainerSummary>, CommandError>;

    /// Raw `image inspect` output for one image.
    async fn inspect_image(&self, image: &str) -> Result<String, CommandError>;
}

/// Orchestration steps whose failure is subject to the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Up,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Build => write!(f, "build"),
            Stage::Up => write!(f, "up"),
        }
    }
}

/// One row of `images --format '{{json .}}'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageSummary {
    pub repository: String,
    pub tag: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub size: String,
}

impl ImageSummary {
    pub fn reference(&self) -> String {
        if self.tag.is_empty() || self.tag == "<none>" {
            self.repository.clone()
        } else {
            format!("{}:{}", self.repository, self.tag)
        }
    }
}

/// One row of `ps --format '{{json .}}'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerSummary {
    #[serde(rename = "ID")]
    pub id: String,
    pub image: String,
    pub names: String,
    pub status: String,
    pub ports: String,
}
