// SPDX-License-Identifier: MIT

//! Control-socket client used by every subcommand except `up` and
//! `tail-audit`: connects, sends one [`Request`], reads one
//! [`Response`], and disconnects — a fresh connection per request rather
//! than a pooled/kept-alive one.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixStream;
use umcc_daemon::protocol_wire::{self, ProtocolError};
use umcc_daemon::{Request, Response};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("umccd is not running at {0}")]
    NotRunning(PathBuf),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, DEFAULT_TIMEOUT).await
    }

    async fn send_with_timeout(&self, request: &Request, timeout: Duration) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound || source.kind() == std::io::ErrorKind::ConnectionRefused
                {
                    ClientError::NotRunning(self.socket_path.clone())
                } else {
                    ClientError::Io(source)
                }
        })?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol_wire::encode(request)?;
        tokio::time::timeout(timeout, protocol_wire::write_message(&mut writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes = tokio::time::timeout(timeout, protocol_wire::read_message(&mut reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol_wire::decode(&response_bytes)?)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
