// ABOUTME: Raw TCP connect probe.
// ABOUTME: Connects and immediately drops the stream; nothing is sent.

use super::ProbeError;
use std::time::Duration;
use tokio::net::TcpStream;

/// Open and close a TCP connection to `host:port` within `timeout`.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(())
        }
        Ok(Err(e)) => Err(ProbeError::Connect(e)),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}
