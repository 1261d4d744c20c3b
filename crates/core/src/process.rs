// SPDX-License-Identifier: MIT

//! `ManagedProcess`: a long-lived child program the core supervises.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use crate::id::ProcessName;

/// How a process signals it is ready to receive traffic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReadinessProbe {
    /// Connect to `host:port` successfully.
    TcpConnect { host: String, port: u16 },
    /// GET `path` on `host:port` and expect HTTP 200.
    HttpOk {
        host: String,
        port: u16,
        path: String,
    },
    /// Wait for a marker file to appear on disk.
    MarkerFile { path: PathBuf },
}

/// Immutable launch specification for a managed process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessSpec {
    pub name: ProcessName,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub readiness: Option<ReadinessProbe>,
    /// Timeout for the readiness probe after the process spawns.
    pub readiness_timeout: Duration,
    /// Grace period given to a graceful-termination signal before force-kill.
    pub stop_grace: Duration,
    /// Maximum consecutive automatic restarts before the process is marked `Failed`.
    pub max_restarts: u32,
}

impl ProcessSpec {
    pub fn new(name: impl Into<ProcessName>, program: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stdout_log: PathBuf::from(format!("{}.stdout", name.as_str())),
            stderr_log: PathBuf::from(format!("{}.stderr", name.as_str())),
            name,
            program: program.into(),
            args: Vec::new(),
            cwd: PathBuf::from("."),
            env: HashMap::new(),
            readiness: None,
            readiness_timeout: Duration::from_secs(10),
            stop_grace: Duration::from_secs(5),
            max_restarts: 5,
        }
    }
}

/// Lifecycle state of a [`ProcessSpec`] instance.
///
/// `Stopped -> Starting -> Ready -> Running -> (Exiting | Failed) -> Stopped`.
/// `Quarantined` is entered only via the Improvement Loop's `dissolution`
/// reaction and blocks `Start` until an explicit operator clearance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Stopped,
    Starting,
    Ready,
    Running,
    Exiting,
    Failed,
    Quarantined,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessState::Stopped => "stopped",
            ProcessState::Starting => "starting",
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Exiting => "exiting",
            ProcessState::Failed => "failed",
            ProcessState::Quarantined => "quarantined",
        };
        write!(f, "{s}")
    }
}

/// A consistent, owned snapshot of a managed process's runtime fields.
///
/// Never a pointer into live supervisor state — callers get a copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessSnapshot {
    pub name: ProcessName,
    pub state: ProcessState,
    pub pid: Option<u32>,
    pub started_at_ms: Option<u64>,
    pub last_exit_code: Option<i32>,
    pub restart_count: u32,
    pub consecutive_failures: u32,
}

impl ProcessSnapshot {
    pub fn new_stopped(name: ProcessName) -> Self {
        Self {
            name,
            state: ProcessState::Stopped,
            pid: None,
            started_at_ms: None,
            last_exit_code: None,
            restart_count: 0,
            consecutive_failures: 0,
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
