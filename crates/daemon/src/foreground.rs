// SPDX-License-Identifier: MIT

//! Foreground daemon run loop shared by `umccd` and `umcc up`. There is exactly one implementation of "start the
//! daemon" — both binaries call this.

use crate::config::Config;
use crate::daemon::{bootstrap, BootstrapError, Daemon};
use fs2::FileExt;
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use umcc_core::{AnyClock, SystemClock};

#[derive(Debug, Error)]
pub enum ForegroundError {
    #[error("bootstrap: {0}")]
    Bootstrap(#[from] BootstrapError),
    #[error("binding control socket at {path}: {source}")]
    Bind { path: std::path::PathBuf, source: std::io::Error },
    #[error("another umccd instance is already running (lock held at {path})")]
    AlreadyRunning { path: std::path::PathBuf },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Acquires the single-instance lock at `config.lock_path`: an `fs2`
/// exclusive lock held for the lifetime of the process, with the holder's
/// PID written inside for diagnostics.
fn acquire_lock(config: &Config) -> Result<std::fs::File, ForegroundError> {
    if let Some(parent) = config.lock_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ForegroundError::Bind {
                path: config.lock_path.clone(),
                source,
        })?;
    }
    let mut file = std::fs::OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(false)
    .open(&config.lock_path)
    .map_err(|source| ForegroundError::Bind { path: config.lock_path.clone(), source })?;

    file.try_lock_exclusive().map_err(|_| ForegroundError::AlreadyRunning { path: config.lock_path.clone() })?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Bootstraps the daemon, binds the control socket, and runs the listener
/// and scheduler concurrently until a shutdown signal arrives — SIGTERM,
/// SIGINT, or a `Request::Shutdown` over the control socket. Returns the process exit code.
pub async fn run_foreground(config: Config) -> Result<i32, ForegroundError> {
    let _lock = acquire_lock(&config)?;

    let bootstrap_result = bootstrap(config.clone(), AnyClock::System(SystemClock)).await?;
    let daemon: Arc<Daemon> = bootstrap_result.daemon;
    let scheduler = bootstrap_result.scheduler;
    let shutdown = bootstrap_result.shutdown;
    let audit_join = bootstrap_result.audit_join;

    daemon.start_all_processes().await;

    let listener = crate::listener::bind(&config.socket_path)
    .map_err(|source| ForegroundError::Bind { path: config.socket_path.clone(), source })?;

    let listener_task = tokio::spawn(crate::listener::serve(listener, Arc::clone(&daemon), shutdown.clone()));
    let scheduler_task = tokio::spawn(scheduler.run(shutdown.clone()));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        () = shutdown.cancelled() => {
            info!("shutdown requested over the control socket");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
            shutdown.cancel();
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
            shutdown.cancel();
        }
    }

    if let Err(err) = listener_task.await {
        warn!(error = %err, "control socket listener task panicked");
    }
    if let Err(err) = scheduler_task.await {
        warn!(error = %err, "scheduler task panicked");
    }

    daemon.shutdown(Duration::from_secs(10)).await;

    if config.socket_path.exists() {
        if let Err(err) = std::fs::remove_file(&config.socket_path) {
            warn!(error = %err, path = ?config.socket_path, "failed to remove control socket on shutdown");
        }
    }

    if let Err(err) = audit_join.await {
        error!(error = %err, "audit writer task panicked");
    }

    Ok(0)
}

#[cfg(test)]
#[path = "foreground_tests.rs"]
mod tests;
