// ABOUTME: Service endpoint configuration.
// ABOUTME: One entry per compose service the verifier probes.

use crate::types::EndpointName;
use nonempty::{NonEmpty, nonempty};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire protocol spoken by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Tcp => write!(f, "tcp"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEndpoint {
    pub name: EndpointName,

    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,

    #[serde(default = "default_protocol")]
    pub protocol: Protocol,

    /// Request path for HTTP endpoints.
    #[serde(default = "default_path")]
    pub path: String,

    /// Require the response body to open with a markup tag.
    #[serde(default)]
    pub expect_markup: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_protocol() -> Protocol {
    Protocol::Http
}

fn default_path() -> String {
    "/".to_string()
}

impl ServiceEndpoint {
    fn new(name: &str, port: u16, protocol: Protocol) -> Self {
        Self {
            name: EndpointName::new(name).expect("endpoint name should use [a-zA-Z0-9._-]"),
            host: default_host(),
            port,
            protocol,
            path: default_path(),
            expect_markup: false,
        }
    }

    /// # Panics
    ///
    /// Panics if `name` is not a valid endpoint name.
    pub fn http(name: &str, port: u16) -> Self {
        Self::new(name, port, Protocol::Http)
    }

    /// # Panics
    ///
    /// Panics if `name` is not a valid endpoint name.
    pub fn tcp(name: &str, port: u16) -> Self {
        Self::new(name, port, Protocol::Tcp)
    }

    pub fn expecting_markup(mut self) -> Self {
        self.expect_markup = true;
        self
    }

    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// `host:port` for display and connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// The banking demo stack: backend, MongoDB, frontend and the nginx proxy.
pub fn default_endpoints() -> NonEmpty<ServiceEndpoint> {
    nonempty![
        ServiceEndpoint::http("backend", 5000),
        ServiceEndpoint::tcp("database", 27017),
        ServiceEndpoint::http("frontend", 3000),
        ServiceEndpoint::http("proxy", 80).expecting_markup(),
    ]
}
