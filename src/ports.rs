// ABOUTME: Port availability checker for the configured endpoints.
// ABOUTME: Pre-flight requires free ports; post-deploy treats bound ports as alive.

use crate::check::CheckResult;
use crate::config::{CheckMode, ServiceEndpoint};
use crate::error::{Error, Result};
use crate::probe::tcp;
use futures::future::join_all;
use std::time::Duration;

/// A port counts as bound when something accepts a TCP connection on it.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> bool {
    tcp::connect(host, port, timeout).await.is_ok()
}

async fn probe_all<'a>(
    endpoints: impl IntoIterator<Item = &'a ServiceEndpoint>,
    timeout: Duration,
) -> Vec<(&'a ServiceEndpoint, bool)> {
    let probes = endpoints.into_iter().map(|endpoint| async move {
        let bound = probe_port(&endpoint.host, endpoint.port, timeout).await;
        (endpoint, bound)
    });
    join_all(probes).await
}

fn subject(endpoint: &ServiceEndpoint) -> String {
    format!("port {} ({})", endpoint.port, endpoint.name)
}

/// Fail with every conflicting endpoint if any configured port is already bound.
pub async fn assert_ports_free<'a>(
    endpoints: impl IntoIterator<Item = &'a ServiceEndpoint>,
    timeout: Duration,
) -> Result<Vec<CheckResult>> {
    let probed = probe_all(endpoints, timeout).await;

    let conflicts: Vec<String> = probed
        .iter()
        .filter(|(_, bound)| *bound)
        .map(|(endpoint, _)| format!("{} ({})", endpoint.address(), endpoint.name))
        .collect();
    if !conflicts.is_empty() {
        return Err(Error::PortConflict(conflicts));
    }

    Ok(probed
        .into_iter()
        .map(|(endpoint, _)| CheckResult::ok(subject(endpoint), "free"))
        .collect())
}

/// Report each configured port as alive (bound) or down (free).
pub async fn assert_ports_bound<'a>(
    endpoints: impl IntoIterator<Item = &'a ServiceEndpoint>,
    timeout: Duration,
) -> Vec<CheckResult> {
    probe_all(endpoints, timeout)
        .await
        .into_iter()
        .map(|(endpoint, bound)| {
            if bound {
                CheckResult::ok(subject(endpoint), "listening")
            } else {
                CheckResult::fail(
                    subject(endpoint),
                    format!("nothing listening on {}", endpoint.address()),
                )
            }
        })
        .collect()
}

/// Run the port check with the semantics of `mode`.
pub async fn check_ports<'a>(
    mode: CheckMode,
    endpoints: impl IntoIterator<Item = &'a ServiceEndpoint>,
    timeout: Duration,
) -> Result<Vec<CheckResult>> {
    match mode {
        CheckMode::Preflight => assert_ports_free(endpoints, timeout).await,
        CheckMode::Postdeploy => Ok(assert_ports_bound(endpoints, timeout).await),
    }
}
