// SPDX-License-Identifier: MIT

//! Async front-end for [`AuditLog`]: a bounded channel plus a single
//! consumer task, so producers (scheduler, supervisor, evaluator,
//! dispatcher) never touch the file directly and never block longer than
//! channel capacity × write latency.

use crate::audit::{AuditDraft, AuditError, AuditEventKind, AuditLog};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

const CHANNEL_CAPACITY: usize = 1024;

/// How long [`AuditError`]s may repeat before the writer gives up and fires
/// `shutdown`.
const UNRECOVERABLE_AFTER: Duration = Duration::from_secs(30);

/// Clonable handle producers use to submit events. Cheap to clone — it is
/// just a channel sender.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditDraft>,
    /// Set once the writer has given up after `UNRECOVERABLE_AFTER` of
    /// failures, so callers can check `is_healthy()` without awaiting a send.
    healthy: Arc<AtomicBool>,
}

impl AuditHandle {
    pub async fn emit(
        &self,
        timestamp_ms: u64,
        kind: AuditEventKind,
        actor: impl Into<String>,
        payload: Value,
    ) -> Result<(), AuditError> {
        let draft = AuditDraft::new(timestamp_ms, kind, actor, payload);
        self.tx
        .send(draft)
        .await
        .map_err(|_| AuditError::Io(std::io::Error::other("audit writer task exited")))
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }
}

/// Spawns the single consumer task. Returns a handle for producers and the
/// `JoinHandle` for the caller to await during shutdown.
///
/// `shutdown` is triggered (cancelled) if writes fail continuously for
/// longer than [`UNRECOVERABLE_AFTER`] — a graceful-shutdown trigger, not a
/// panic.
pub fn spawn_writer(
    log: Arc<AuditLog>,
    shutdown: CancellationToken,
) -> (AuditHandle, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let healthy = Arc::new(AtomicBool::new(true));
    let healthy_task = healthy.clone();

    let join = tokio::spawn(async move {
            let mut first_failure: Option<Instant> = None;
            while let Some(draft) = rx.recv().await {
                match log.append(draft) {
                    Ok(_) => {
                        first_failure = None;
                        healthy_task.store(true, Ordering::Release);
                    }
                    Err(err) => {
                        warn!(error = %err, "audit write failed");
                        let since = *first_failure.get_or_insert_with(Instant::now);
                        if since.elapsed() >= UNRECOVERABLE_AFTER {
                            error!("audit log unrecoverable for 30s, initiating shutdown");
                            healthy_task.store(false, Ordering::Release);
                            shutdown.cancel();
                            break;
                        }
                    }
                }
            }
    });

    (tx_to_handle(tx, healthy), join)
}

fn tx_to_handle(tx: mpsc::Sender<AuditDraft>, healthy: Arc<AtomicBool>) -> AuditHandle {
    AuditHandle { tx, healthy }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
