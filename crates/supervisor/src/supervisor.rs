// SPDX-License-Identifier: MIT

//! `Supervisor`: fan-out lifecycle control over N managed children
//!. Exclusively owns every `ManagedProcess` record and its
//! PID file; a dedicated tokio task per process does the actual mutation
//! (see [`crate::process_actor`]) so the supervisor itself never locks
//! across I/O.

use crate::process_actor::{self, ActorCommand, ActorHandle};
use crate::SupervisorError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use umcc_core::{AnyClock, ProcessName, ProcessSnapshot, ProcessSpec};
use umcc_storage::AuditHandle;

struct Entry {
    spec: ProcessSpec,
    handle: ActorHandle,
}

struct Inner {
    order: Vec<ProcessName>,
    entries: HashMap<ProcessName, Entry>,
}

pub struct Supervisor {
    inner: Mutex<Inner>,
    pids_dir: PathBuf,
    clock: AnyClock,
    audit: AuditHandle,
}

impl Supervisor {
    pub fn new(pids_dir: PathBuf, clock: AnyClock, audit: AuditHandle) -> Self {
        Self {
            inner: Mutex::new(Inner {
                    order: Vec::new(),
                    entries: HashMap::new(),
            }),
            pids_dir,
            clock,
            audit,
        }
    }

    /// Validates `spec`; idempotent by name. Fails with `AlreadyRegistered`
    /// if a *different* spec already exists for that name.
    pub fn register(&self, spec: ProcessSpec) -> Result<(), SupervisorError> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.entries.get(&spec.name) {
            return if existing.spec == spec {
                Ok(())
            } else {
                Err(SupervisorError::AlreadyRegistered(spec.name.clone()))
            };
        }

        let handle = process_actor::spawn(spec.clone(), self.pids_dir.clone(), self.clock.clone(), self.audit.clone());
        inner.order.push(spec.name.clone());
        inner.entries.insert(spec.name.clone(), Entry { spec, handle });
        Ok(())
    }

    fn handle_for(&self, name: &ProcessName) -> Result<ActorHandleRef, SupervisorError> {
        let inner = self.inner.lock();
        inner
        .entries
        .get(name)
        .map(|e| ActorHandleRef(e.handle.tx.clone()))
        .ok_or_else(|| SupervisorError::NotRegistered(name.clone()))
    }

    pub async fn start(&self, name: &ProcessName) -> Result<ProcessSnapshot, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Start(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))?
    }

    pub async fn stop(&self, name: &ProcessName, grace: Duration) -> Result<ProcessSnapshot, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Stop(grace, tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))?
    }

    pub async fn restart(&self, name: &ProcessName) -> Result<ProcessSnapshot, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Restart(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))?
    }

    pub async fn status(&self, name: &ProcessName) -> Result<ProcessSnapshot, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Status(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))
    }

    /// Re-checks a `Running` process's readiness probe (the `health_probe`
    /// job's re-check, as opposed to the one-shot check `start` performs).
    /// Returns `true` if the process is healthy or not currently `Running`;
    /// `false` means the process was just transitioned to `Failed`.
    pub async fn health_check(&self, name: &ProcessName) -> Result<bool, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::HealthCheck(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))
    }

    pub async fn quarantine(&self, name: &ProcessName) -> Result<(), SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Quarantine(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))
    }

    /// Operator clearance: moves a `Quarantined` process back to `Stopped`.
    pub async fn clear(&self, name: &ProcessName) -> Result<(), SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.handle_for(name)?.0.send(ActorCommand::Clear(tx)).await.map_err(|_| SupervisorError::ActorGone(name.clone()))?;
        rx.await.map_err(|_| SupervisorError::ActorGone(name.clone()))?
    }

    /// Snapshot of every registered process, in registration order.
    pub async fn status_all(&self) -> Vec<ProcessSnapshot> {
        let names: Vec<ProcessName> = self.inner.lock().order.clone();
        let mut out = Vec::with_capacity(names.len());
        for name in &names {
            if let Ok(snap) = self.status(name).await {
                out.push(snap);
            }
        }
        out
    }

    /// Stops every process in reverse registration order and blocks until
    /// all are `Stopped`.
    pub async fn shutdown(&self, grace: Duration) {
        let mut names: Vec<ProcessName> = self.inner.lock().order.clone();
        names.reverse();
        for name in names {
            if let Ok(handle) = self.handle_for(&name) {
                let (tx, rx) = oneshot::channel();
                if handle.0.send(ActorCommand::Shutdown(grace, tx)).await.is_ok() {
                    let _ = rx.await;
                }
            }
        }
    }
}

struct ActorHandleRef(tokio::sync::mpsc::Sender<ActorCommand>);

#[async_trait]
impl crate::controller::ProcessController for Supervisor {
    async fn restart(&self, name: &ProcessName) -> bool {
        Supervisor::restart(self, name).await.is_ok()
    }

    async fn quarantine(&self, name: &ProcessName) -> bool {
        Supervisor::quarantine(self, name).await.is_ok()
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
