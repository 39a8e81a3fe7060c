// ABOUTME: Run mode and orchestration failure policy.
// ABOUTME: Both are explicit settings rather than implied by pipeline position.

use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// How the port checker interprets a bound port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CheckMode {
    /// Services are about to be started: a bound port is a conflict.
    #[default]
    Preflight,
    /// Services should already be running: a bound port means alive.
    Postdeploy,
}

impl FromStr for CheckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preflight" | "pre-flight" => Ok(CheckMode::Preflight),
            "postdeploy" | "post-deploy" => Ok(CheckMode::Postdeploy),
            _ => Err(format!("unknown mode: {}", s)),
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMode::Preflight => write!(f, "preflight"),
            CheckMode::Postdeploy => write!(f, "postdeploy"),
        }
    }
}

impl<'de> Deserialize<'de> for CheckMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// What to do when building or starting the services fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Abort the run.
    #[default]
    FailFast,
    /// Record a failed check and keep going.
    BestEffort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(FailurePolicy::FailFast),
            "best-effort" => Ok(FailurePolicy::BestEffort),
            _ => Err(format!("unknown failure policy: {}", s)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::BestEffort => write!(f, "best-effort"),
        }
    }
}

impl<'de> Deserialize<'de> for FailurePolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
