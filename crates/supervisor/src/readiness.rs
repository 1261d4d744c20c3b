// SPDX-License-Identifier: MIT

//! Readiness probes: TCP connect, HTTP 200, or marker-file appearance.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use umcc_core::ReadinessProbe;

/// Poll `probe` until it succeeds or `timeout` elapses, checking every
/// `poll_interval`.
pub async fn wait_ready(probe: &ReadinessProbe, overall_timeout: Duration) -> bool {
    let poll_interval = Duration::from_millis(100);
    let deadline = tokio::time::Instant::now() + overall_timeout;

    loop {
        if check_once(probe).await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

async fn check_once(probe: &ReadinessProbe) -> bool {
    match probe {
        ReadinessProbe::TcpConnect { host, port } => {
            let addr = format!("{host}:{port}");
            matches!(
                timeout(Duration::from_millis(500), TcpStream::connect(&addr)).await,
                Ok(Ok(_))
            )
        }
        ReadinessProbe::HttpOk { host, port, path } => {
            check_http_ok(host, *port, path).await.unwrap_or(false)
        }
        ReadinessProbe::MarkerFile { path } => path.exists(),
    }
}

/// Minimal HTTP/1.0 GET over a raw TCP stream — no client crate needed for
/// a single status-line check.
async fn check_http_ok(host: &str, port: u16, path: &str) -> Option<bool> {
    let addr = format!("{host}:{port}");
    let mut stream = timeout(Duration::from_millis(500), TcpStream::connect(&addr))
    .await
    .ok()?
    .ok()?;

    let request = format!("GET {path} HTTP/1.0\r\nHost: {host}\r\nConnection: close\r\n\r\n");
    timeout(Duration::from_millis(500), stream.write_all(request.as_bytes()))
    .await
    .ok()?
    .ok()?;

    let mut response = Vec::with_capacity(64);
    let mut buf = [0u8; 64];
    let n = timeout(Duration::from_millis(500), stream.read(&mut buf))
    .await
    .ok()?
    .ok()?;
    response.extend_from_slice(&buf[..n]);
    let status_line = String::from_utf8_lossy(&response);
    Some(status_line.starts_with("HTTP/1.0 200") || status_line.starts_with("HTTP/1.1 200"))
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
