// SPDX-License-Identifier: MIT

//! Control-socket listener: accepts connections on
//! `control.sock` and spawns one task per connection — a request never
//! blocks acceptance of the next one.

use crate::daemon::Daemon;
use crate::protocol::{Request, Response};
use crate::protocol_wire::{self, ProtocolError, DEFAULT_TIMEOUT};
use std::path::Path;
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use umcc_core::ErrorKind;

/// Removes a stale socket file left by an unclean shutdown, then binds fresh.
/// Creates the parent directory if it doesn't exist yet.
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    UnixListener::bind(socket_path)
}

/// Accepts connections until `shutdown` fires, spawning one detached task per
/// connection so a slow or stuck client never blocks the next `accept`.
pub async fn serve(listener: UnixListener, daemon: Arc<Daemon>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                info!("control socket listener shutting down");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let daemon = Arc::clone(&daemon);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                                if let Err(err) = handle_connection(stream, &daemon, &shutdown).await {
                                    match err {
                                        ProtocolError::ConnectionClosed => debug!("client disconnected"),
                                        ProtocolError::Timeout => warn!("control connection timed out"),
                                        other => error!(error = %other, "control connection error"),
                                    }
                                }
                        });
                    }
                    Err(err) => {
                        error!(error = %err, "accept failed on control socket");
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    daemon: &Arc<Daemon>,
    shutdown: &CancellationToken,
) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();
    let request = protocol_wire::read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    debug!(request = ?request, "received control request");

    let response = dispatch(daemon, shutdown, request).await;
    protocol_wire::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await
}

async fn dispatch(daemon: &Arc<Daemon>, shutdown: &CancellationToken, request: Request) -> Response {
    match request {
        Request::Status => Response::ok(daemon.status_payload().await),
        Request::Shutdown => {
            shutdown.cancel();
            Response::ok(serde_json::json!({ "shutting_down": true }))
        }
        Request::RunOnce { job } => match daemon.run_once(&job).await {
            Some(outcome) => Response::ok(serde_json::json!({ "job": job, "outcome": outcome })),
            None => Response::err(ErrorKind::Protocol, format!("no such job: {job}")),
        },
        Request::Ask { utterance } => {
            let result = daemon.ask(&utterance).await;
            Response::ok(serde_json::to_value(&result).unwrap_or_else(|err| {
                        serde_json::json!({ "error": err.to_string() })
            }))
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
