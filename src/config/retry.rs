// ABOUTME: Retry settings for health probes.
// ABOUTME: Services may still be starting right after `up`, so probes get a second chance.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_backoff", with = "humantime_serde")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff: default_backoff(),
        }
    }
}

impl RetryConfig {
    pub fn none() -> Self {
        Self {
            attempts: 0,
            backoff: Duration::ZERO,
        }
    }
}

fn default_attempts() -> u32 {
    1
}

fn default_backoff() -> Duration {
    Duration::from_secs(2)
}
