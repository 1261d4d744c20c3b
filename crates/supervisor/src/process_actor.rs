// SPDX-License-Identifier: MIT

//! Per-process actor: a dedicated tokio task owns one `ManagedProcess`'s
//! state and drains a bounded command channel. No other
//! task ever touches this process's fields directly.

use crate::pidfile;
use crate::readiness;
use crate::SupervisorError;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use umcc_core::{AnyClock, Clock, ProcessSnapshot, ProcessSpec, ProcessState};
use umcc_storage::{AuditEventKind, AuditHandle};

pub enum ActorCommand {
    Start(oneshot::Sender<Result<ProcessSnapshot, SupervisorError>>),
    Stop(
        Duration,
        oneshot::Sender<Result<ProcessSnapshot, SupervisorError>>,
    ),
    Restart(oneshot::Sender<Result<ProcessSnapshot, SupervisorError>>),
    Status(oneshot::Sender<ProcessSnapshot>),
    Quarantine(oneshot::Sender<()>),
    Clear(oneshot::Sender<Result<(), SupervisorError>>),
    HealthCheck(oneshot::Sender<bool>),
    Shutdown(Duration, oneshot::Sender<()>),
}

/// How long a `health_probe` re-check is allowed to wait per process —
/// short relative to the initial `readiness_timeout`, since this runs
/// against an already-`Running` process on a 30s cadence with a 20s job
/// deadline shared across every managed process.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

pub struct ActorHandle {
    pub tx: mpsc::Sender<ActorCommand>,
}

pub fn spawn(spec: ProcessSpec, pids_dir: PathBuf, clock: AnyClock, audit: AuditHandle) -> ActorHandle {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(run(spec, pids_dir, clock, audit, rx));
    ActorHandle { tx }
}

async fn run(
    spec: ProcessSpec,
    pids_dir: PathBuf,
    clock: AnyClock,
    audit: AuditHandle,
    mut rx: mpsc::Receiver<ActorCommand>,
) {
    let pid_path = pidfile::path_for(&pids_dir, spec.name.as_str());
    let mut snapshot = ProcessSnapshot::new_stopped(spec.name.clone());
    let mut child: Option<Child> = None;

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                match cmd {
                    None => break,
                    Some(ActorCommand::Start(reply)) => {
                        let result = do_start(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child).await;
                        let _ = reply.send(result);
                    }
                    Some(ActorCommand::Stop(grace, reply)) => {
                        let result = do_stop(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child, grace).await;
                        let _ = reply.send(result);
                    }
                    Some(ActorCommand::Restart(reply)) => {
                        let _ = do_stop(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child, spec.stop_grace).await;
                        snapshot.restart_count += 1;
                        let result = do_start(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child).await;
                        if result.is_ok() {
                            snapshot.consecutive_failures = 0;
                        }
                        let _ = reply.send(result);
                    }
                    Some(ActorCommand::Status(reply)) => {
                        let _ = reply.send(snapshot.clone());
                    }
                    Some(ActorCommand::Quarantine(reply)) => {
                        let _ = do_stop(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child, spec.stop_grace).await;
                        snapshot.state = ProcessState::Quarantined;
                        emit(&audit, &clock, &spec, "quarantined").await;
                        let _ = reply.send(());
                    }
                    Some(ActorCommand::HealthCheck(reply)) => {
                        let healthy = do_health_check(&spec, &clock, &audit, &mut snapshot).await;
                        let _ = reply.send(healthy);
                    }
                    Some(ActorCommand::Clear(reply)) => {
                        let result = if snapshot.state == ProcessState::Quarantined {
                            snapshot.state = ProcessState::Stopped;
                            snapshot.consecutive_failures = 0;
                            Ok(())
                        } else {
                            Err(SupervisorError::NotRegistered(spec.name.clone()))
                        };
                        let _ = reply.send(result);
                    }
                    Some(ActorCommand::Shutdown(grace, reply)) => {
                        let _ = do_stop(&spec, &pid_path, &clock, &audit, &mut snapshot, &mut child, grace).await;
                        let _ = reply.send(());
                        break;
                    }
                }
            }
            exit = wait_child(&mut child), if child.is_some() => {
                child = None;
                handle_unexpected_exit(&spec, &pid_path, &clock, &audit, &mut snapshot, exit).await;
            }
        }
    }
}

async fn wait_child(child: &mut Option<Child>) -> std::io::Result<std::process::ExitStatus> {
    match child {
        Some(c) => c.wait().await,
        None => std::future::pending().await,
    }
}

async fn emit(
    audit: &AuditHandle,
    clock: &AnyClock,
    spec: &ProcessSpec,
    event: &str,
) {
    let _ = audit
    .emit(
        clock.epoch_ms(),
        AuditEventKind::ProcessState,
        spec.name.as_str(),
        json!({ "event": event }),
    )
    .await;
}

async fn do_start(
    spec: &ProcessSpec,
    pid_path: &std::path::Path,
    clock: &AnyClock,
    audit: &AuditHandle,
    snapshot: &mut ProcessSnapshot,
    child: &mut Option<Child>,
) -> Result<ProcessSnapshot, SupervisorError> {
    if snapshot.state == ProcessState::Running {
        return Ok(snapshot.clone());
    }
    if snapshot.state == ProcessState::Quarantined {
        return Err(SupervisorError::Quarantined(spec.name.clone()));
    }

    snapshot.state = ProcessState::Starting;
    emit(audit, clock, spec, "starting").await;

    let stdout = open_log(&spec.stdout_log).await?;
    let stderr = open_log(&spec.stderr_log).await?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
    .current_dir(&spec.cwd)
    .envs(&spec.env)
    .stdout(stdout.into_std().await)
    .stderr(stderr.into_std().await)
    .stdin(Stdio::null());

    let mut spawned = cmd.spawn().map_err(|source| SupervisorError::Spawn {
            name: spec.name.clone(),
            source,
    })?;
    let pid = spawned.id().unwrap_or(0);

    pidfile::write(pid_path, pid)?;
    snapshot.pid = Some(pid);
    snapshot.started_at_ms = Some(clock.epoch_ms());

    let ready = match &spec.readiness {
        Some(probe) => readiness::wait_ready(probe, spec.readiness_timeout).await,
        None => true,
    };

    if !ready {
        let _ = spawned.start_kill();
        let _ = spawned.wait().await;
        pidfile::remove(pid_path)?;
        snapshot.state = ProcessState::Failed;
        snapshot.pid = None;
        snapshot.consecutive_failures += 1;
        emit(audit, clock, spec, "failed_readiness").await;
        return Err(SupervisorError::ReadinessTimeout(spec.name.clone()));
    }

    snapshot.state = ProcessState::Running;
    *child = Some(spawned);
    emit(audit, clock, spec, "running").await;
    Ok(snapshot.clone())
}

/// Re-checks a `Running` process's readiness probe. A process with no
/// configured probe, or one that isn't currently `Running`, is trivially
/// healthy — this job only re-verifies processes the supervisor already
/// believes are up. On failure the process is marked `Failed` (the PID
/// file and child handle are left alone; the still-live child is reaped
/// properly by `do_stop` when `supervisor_tick` drives the next restart)
/// so the next `supervisor_tick` picks it up for a backed-off restart.
async fn do_health_check(
    spec: &ProcessSpec,
    clock: &AnyClock,
    audit: &AuditHandle,
    snapshot: &mut ProcessSnapshot,
) -> bool {
    if snapshot.state != ProcessState::Running {
        return true;
    }
    let Some(probe) = &spec.readiness else {
        return true;
    };

    if readiness::wait_ready(probe, HEALTH_CHECK_TIMEOUT).await {
        return true;
    }

    snapshot.state = ProcessState::Failed;
    snapshot.consecutive_failures += 1;
    emit(audit, clock, spec, "health_check_failed").await;
    false
}

async fn open_log(path: &std::path::Path) -> std::io::Result<tokio::fs::File> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    OpenOptions::new().create(true).append(true).open(path).await
}

async fn do_stop(
    spec: &ProcessSpec,
    pid_path: &std::path::Path,
    clock: &AnyClock,
    audit: &AuditHandle,
    snapshot: &mut ProcessSnapshot,
    child: &mut Option<Child>,
    grace: Duration,
) -> Result<ProcessSnapshot, SupervisorError> {
    if snapshot.state == ProcessState::Stopped {
        return Ok(snapshot.clone());
    }

    snapshot.state = ProcessState::Exiting;
    emit(audit, clock, spec, "exiting").await;

    if let Some(mut c) = child.take() {
        if let Some(pid) = c.id() {
            let _ = kill(NixPid::from_raw(pid as i32), Signal::SIGTERM);
        }
        let waited = tokio::time::timeout(grace, c.wait()).await;
        if waited.is_err() {
            let _ = c.start_kill();
            let _ = c.wait().await;
        }
    }

    // Always remove the PID file last, on every exit path.
    pidfile::remove(pid_path)?;
    snapshot.state = ProcessState::Stopped;
    snapshot.pid = None;
    emit(audit, clock, spec, "stopped").await;
    Ok(snapshot.clone())
}

async fn handle_unexpected_exit(
    spec: &ProcessSpec,
    pid_path: &std::path::Path,
    clock: &AnyClock,
    audit: &AuditHandle,
    snapshot: &mut ProcessSnapshot,
    exit: std::io::Result<std::process::ExitStatus>,
) {
    let code = exit.ok().and_then(|s| s.code());
    snapshot.last_exit_code = code;
    let _ = pidfile::remove(pid_path);
    snapshot.pid = None;

    if snapshot.consecutive_failures + 1 > spec.max_restarts {
        snapshot.state = ProcessState::Failed;
        emit(audit, clock, spec, "failed").await;
        return;
    }

    snapshot.consecutive_failures += 1;
    snapshot.state = ProcessState::Failed;
    emit(audit, clock, spec, "unexpected_exit").await;
    // Actual restart (and its backoff delay, via `umcc_supervisor::backoff`)
    // is driven by the `supervisor_tick` scheduler job, which observes
    // `Failed` via `Status` and calls `Restart` once the delay elapses.
}
