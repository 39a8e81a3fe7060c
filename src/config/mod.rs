// ABOUTME: Configuration types and parsing for deploy-verify.yml.
// ABOUTME: Every field has a default, so the file is optional.

mod endpoint;
mod init;
mod mode;
mod retry;
mod tool;

pub use endpoint::{Protocol, ServiceEndpoint, default_endpoints};
pub use init::init_config;
pub use mode::{CheckMode, FailurePolicy};
pub use retry::RetryConfig;
pub use tool::{ToolRequirement, default_tools};

use crate::error::{Error, Result};
use crate::types::ImageRef;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deploy-verify.yml";
pub const CONFIG_FILENAME_ALT: &str = "deploy-verify.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deploy-verify/config.yml";

pub const DEFAULT_REPORT: &str = "image_metadata.txt";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: CheckMode,

    pub policy: FailurePolicy,

    /// Per-probe timeout for port and health checks.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Upper bound for each external command (build can be slow).
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,

    pub retry: RetryConfig,

    /// Metadata report path, relative to the manifest directory.
    pub report: PathBuf,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub proxy_image: ImageRef,

    /// Container runtime CLI used for listing and inspection.
    pub runtime: String,

    /// Orchestration CLI, possibly with a leading subcommand (`docker compose`).
    #[serde(deserialize_with = "deserialize_command")]
    pub compose: NonEmpty<String>,

    pub tools: Vec<ToolRequirement>,

    #[serde(deserialize_with = "deserialize_endpoints")]
    pub endpoints: NonEmpty<ServiceEndpoint>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: CheckMode::default(),
            policy: FailurePolicy::default(),
            timeout: default_timeout(),
            command_timeout: default_command_timeout(),
            retry: RetryConfig::default(),
            report: PathBuf::from(DEFAULT_REPORT),
            proxy_image: default_proxy_image(),
            runtime: "docker".to_string(),
            compose: NonEmpty::new("docker-compose".to_string()),
            tools: default_tools(),
            endpoints: default_endpoints(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_proxy_image() -> ImageRef {
    ImageRef::parse("nginx").expect("nginx should be a valid image reference")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the config file from `dir`, or fall back to defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        tracing::debug!("No config file in {}, using defaults", dir.display());
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate endpoint: {}",
                    endpoint.name
                )));
            }
            if endpoint.port == 0 {
                return Err(Error::InvalidConfig(format!(
                    "endpoint {} has port 0",
                    endpoint.name
                )));
            }
            if endpoint.protocol == Protocol::Http && !endpoint.path.starts_with('/') {
                return Err(Error::InvalidConfig(format!(
                    "endpoint {} path must start with '/'",
                    endpoint.name
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".to_string()));
        }

        if self.runtime.trim().is_empty() {
            return Err(Error::InvalidConfig("runtime cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Resolve the report path against the manifest directory.
    pub fn report_path(&self, dir: &Path) -> PathBuf {
        if self.report.is_absolute() {
            self.report.clone()
        } else {
            dir.join(&self.report)
        }
    }
}

// Custom deserializers

fn deserialize_image_ref<'de, D>(deserializer: D) -> std::result::Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

fn deserialize_command<'de, D>(deserializer: D) -> std::result::Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entry = CommandEntry::deserialize(deserializer)?;
    let words = match entry {
        CommandEntry::Line(line) => line.split_whitespace().map(str::to_string).collect(),
        CommandEntry::Words(words) => words,
    };

    NonEmpty::from_vec(words)
        .ok_or_else(|| serde::de::Error::custom("compose command cannot be empty"))
}

fn deserialize_endpoints<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<ServiceEndpoint>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let endpoints: Vec<ServiceEndpoint> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(endpoints)
        .ok_or_else(|| serde::de::Error::custom("at least one endpoint is required"))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandEntry {
    Line(String),
    Words(Vec<String>),
}
