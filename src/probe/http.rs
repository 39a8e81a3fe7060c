// ABOUTME: Minimal HTTP/1 GET probe over a plain TCP connection.
// ABOUTME: Built directly on hyper's connection API; the whole exchange is time-bounded.

use super::ProbeError;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::TcpStream;

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// GET `http://host:port{path}`, bounded by `timeout` end to end.
///
/// Without `read_body` the exchange ends at the response head and the body is left empty,
/// so endpoints that stream or long-poll still count as answering.
pub async fn get(
    host: &str,
    port: u16,
    path: &str,
    timeout: Duration,
    read_body: bool,
) -> Result<HttpResponse, ProbeError> {
    tokio::time::timeout(timeout, get_inner(host, port, path, read_body))
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

async fn get_inner(
    host: &str,
    port: u16,
    path: &str,
    read_body: bool,
) -> Result<HttpResponse, ProbeError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(ProbeError::Connect)?;

    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(ProbeError::Http)?;

    // Drive the connection until the response is read.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("probe connection error: {}", e);
        }
    });

    let req = hyper::Request::builder()
        .method("GET")
        .uri(path)
        .header("Host", format!("{host}:{port}"))
        .header("User-Agent", concat!("deploy-verify/", env!("CARGO_PKG_VERSION")))
        .header("Connection", "close")
        .body(Empty::<Bytes>::new())
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    let resp = sender.send_request(req).await.map_err(ProbeError::Http)?;
    let status = resp.status().as_u16();

    if !read_body {
        return Ok(HttpResponse {
            status,
            body: Bytes::new(),
        });
    }

    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(ProbeError::Http)?
        .to_bytes();

    Ok(HttpResponse { status, body })
}
