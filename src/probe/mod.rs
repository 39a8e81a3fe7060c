// ABOUTME: Health prober for the started services.
// ABOUTME: HTTP endpoints must answer 200; TCP endpoints must accept a connection.

pub mod http;
pub mod tcp;

use crate::check::CheckResult;
use crate::config::{Protocol, RetryConfig, ServiceEndpoint};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Lines of the response body searched for an opening markup tag.
pub const MARKUP_SCAN_LINES: usize = 10;

/// Why a single probe attempt was unhealthy.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] hyper::Error),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
}

/// Timing knobs shared by every probe in a run.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub retry: RetryConfig,
}

/// Probe every endpoint concurrently; results come back in endpoint order.
pub async fn probe_endpoints<'a>(
    endpoints: impl IntoIterator<Item = &'a ServiceEndpoint>,
    settings: &ProbeSettings,
) -> Vec<CheckResult> {
    let probes = endpoints
        .into_iter()
        .map(|endpoint| probe_endpoint(endpoint, settings));

    join_all(probes).await.into_iter().flatten().collect()
}

/// Probe one endpoint. HTTP endpoints with `expect_markup` yield a second, content result.
pub async fn probe_endpoint(
    endpoint: &ServiceEndpoint,
    settings: &ProbeSettings,
) -> Vec<CheckResult> {
    match endpoint.protocol {
        Protocol::Tcp => vec![probe_tcp(endpoint, settings).await],
        Protocol::Http => probe_http(endpoint, settings).await,
    }
}

async fn probe_tcp(endpoint: &ServiceEndpoint, settings: &ProbeSettings) -> CheckResult {
    let outcome = with_retry(endpoint, &settings.retry, move || {
        tcp::connect(&endpoint.host, endpoint.port, settings.timeout)
    })
    .await;

    match outcome {
        Ok(()) => CheckResult::ok(
            endpoint.name.as_str(),
            format!("tcp {} accepted a connection", endpoint.address()),
        ),
        Err(e) => CheckResult::fail(
            endpoint.name.as_str(),
            format!("tcp {}: {}", endpoint.address(), e),
        ),
    }
}

async fn probe_http(endpoint: &ServiceEndpoint, settings: &ProbeSettings) -> Vec<CheckResult> {
    let outcome = with_retry(endpoint, &settings.retry, move || async move {
        let response = http::get(
            &endpoint.host,
            endpoint.port,
            &endpoint.path,
            settings.timeout,
            endpoint.expect_markup,
        )
        .await?;
        if response.status == 200 {
            Ok(response)
        } else {
            Err(ProbeError::UnexpectedStatus(response.status))
        }
    })
    .await;

    let content_subject = format!("{} content", endpoint.name);

    match outcome {
        Ok(response) => {
            let mut results = vec![CheckResult::ok(
                endpoint.name.as_str(),
                format!("GET {} returned 200", endpoint.url()),
            )];
            if endpoint.expect_markup {
                results.push(check_markup(&content_subject, &response.body_text()));
            }
            results
        }
        Err(e) => {
            let mut results = vec![CheckResult::fail(
                endpoint.name.as_str(),
                format!("GET {}: {}", endpoint.url(), e),
            )];
            if endpoint.expect_markup {
                results.push(CheckResult::fail(
                    content_subject,
                    "no response body to inspect",
                ));
            }
            results
        }
    }
}

fn check_markup(subject: &str, body: &str) -> CheckResult {
    if has_markup_open_tag(body, MARKUP_SCAN_LINES) {
        CheckResult::ok(subject, "response body contains markup")
    } else {
        CheckResult::fail(
            subject,
            format!("no opening markup tag in the first {MARKUP_SCAN_LINES} lines"),
        )
    }
}

/// Whether one of the first `max_lines` lines contains an opening tag such as
/// `<html>`, `<!DOCTYPE html>` or `<div class="x">`.
pub fn has_markup_open_tag(body: &str, max_lines: usize) -> bool {
    body.lines().take(max_lines).any(|line| {
        line.as_bytes()
            .windows(2)
            .any(|pair| pair[0] == b'<' && (pair[1].is_ascii_alphabetic() || pair[1] == b'!'))
    })
}

/// Run `attempt`, retrying up to `retry.attempts` more times after `retry.backoff`.
async fn with_retry<T, F, Fut>(
    endpoint: &ServiceEndpoint,
    retry: &RetryConfig,
    mut attempt: F,
) -> Result<T, ProbeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProbeError>>,
{
    let mut remaining = retry.attempts;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining > 0 => {
                remaining -= 1;
                tracing::debug!(
                    "{} unhealthy ({}), retrying in {:?}",
                    endpoint.name,
                    e,
                    retry.backoff
                );
                tokio::time::sleep(retry.backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
