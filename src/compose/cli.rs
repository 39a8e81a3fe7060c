// ABOUTME: Orchestrator backed by the docker / docker-compose command-line tools.
// ABOUTME: Listing commands use Go-template JSON output, one object per line.

use super::{ContainerSummary, ImageSummary, Manifest, Orchestrator};
use crate::config::Config;
use crate::process::{self, CommandError, ParseSnafu};
use async_trait::async_trait;
use nonempty::NonEmpty;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use std::time::Duration;

const JSON_FORMAT: &str = "{{json .}}";

/// Shells out to the container runtime and orchestration CLIs.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    runtime: String,
    compose: NonEmpty<String>,
    timeout: Duration,
}

impl ComposeCli {
    pub fn new(runtime: impl Into<String>, compose: NonEmpty<String>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            compose,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.runtime.clone(),
            config.compose.clone(),
            config.command_timeout,
        )
    }

    /// Arguments for `<compose> -f <manifest> <action...>`, after the program name.
    ///
    /// The command runs inside the manifest directory, so `-f` names the file only.
    fn compose_args(&self, manifest: &Manifest, action: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = self.compose.tail.clone();
        args.push("-f".to_string());
        args.push(manifest.file_name().to_string_lossy().to_string());
        args.extend(action.iter().map(|s| s.to_string()));
        args
    }

    async fn compose(&self, manifest: &Manifest, action: &[&str]) -> Result<(), CommandError> {
        let args = self.compose_args(manifest, action);
        process::run(&self.compose.head, &args, Some(manifest.dir()), self.timeout).await?;
        Ok(())
    }

    async fn list<T: DeserializeOwned>(&self, subcommand: &str) -> Result<Vec<T>, CommandError> {
        let args = vec![
            subcommand.to_string(),
            "--format".to_string(),
            JSON_FORMAT.to_string(),
        ];
        let output = process::run(&self.runtime, &args, None, self.timeout).await?;
        parse_json_lines(&output.stdout).context(ParseSnafu {
            command: process::display_command(&self.runtime, &args),
        })
    }
}

#[async_trait]
impl Orchestrator for ComposeCli {
    async fn build(&self, manifest: &Manifest) -> Result<(), CommandError> {
        self.compose(manifest, &["build"]).await
    }

    async fn up(&self, manifest: &Manifest) -> Result<(), CommandError> {
        self.compose(manifest, &["up", "-d"]).await
    }

    async fn images(&self) -> Result<Vec<ImageSummary>, CommandError> {
        self.list("images").await
    }

    async fn containers(&self) -> Result<Vec<ContainerSummary>, CommandError> {
        self.list("ps").await
    }

    async fn inspect_image(&self, image: &str) -> Result<String, CommandError> {
        let args = vec!["image".to_string(), "inspect".to_string(), image.to_string()];
        let output = process::run(&self.runtime, &args, None, self.timeout).await?;
        Ok(output.stdout)
    }
}

/// Parse one JSON document per non-blank line.
pub(crate) fn parse_json_lines<T: DeserializeOwned>(
    stdout: &str,
) -> Result<Vec<T>, serde_json::Error> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}
