// ABOUTME: Name of a probed endpoint, matching the compose service it stands for.
// ABOUTME: Accepts the compose service-name alphabet: ASCII letters, digits, `.`, `_` and `-`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointNameError {
    #[error("endpoint name cannot be empty")]
    Empty,

    #[error("endpoint name {name:?} has invalid character {ch:?} at position {index}")]
    InvalidChar { name: String, ch: char, index: usize },
}

/// A compose service name, e.g. `backend`, `bank_api` or `proxy.v2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointName(String);

fn allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')
}

impl EndpointName {
    pub fn new(value: impl Into<String>) -> Result<Self, EndpointNameError> {
        let name = value.into();
        if name.is_empty() {
            return Err(EndpointNameError::Empty);
        }
        match name.char_indices().find(|(_, ch)| !allowed(*ch)) {
            Some((index, ch)) => Err(EndpointNameError::InvalidChar { name, ch, index }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EndpointName {
    type Err = EndpointNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EndpointName {
    type Error = EndpointNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EndpointName> for String {
    fn from(name: EndpointName) -> Self {
        name.0
    }
}

impl AsRef<str> for EndpointName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
