// SPDX-License-Identifier: MIT

use thiserror::Error;
use umcc_core::{ErrorKind, ProcessName};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("process {0} is already registered with a different spec")]
    AlreadyRegistered(ProcessName),
    #[error("process {0} is not registered")]
    NotRegistered(ProcessName),
    #[error("process {0} is quarantined; explicit clearance required")]
    Quarantined(ProcessName),
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: ProcessName,
        #[source]
        source: std::io::Error,
    },
    #[error("readiness probe for {0} did not succeed within its timeout")]
    ReadinessTimeout(ProcessName),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("the supervisor actor for {0} has shut down")]
    ActorGone(ProcessName),
}

impl SupervisorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SupervisorError::Spawn { .. } => ErrorKind::Spawn,
            SupervisorError::ReadinessTimeout(_) => ErrorKind::Spawn,
            SupervisorError::AlreadyRegistered(_) => ErrorKind::Config,
            SupervisorError::NotRegistered(_) => ErrorKind::Config,
            SupervisorError::Quarantined(_) => ErrorKind::Spawn,
            SupervisorError::Io(_) => ErrorKind::Spawn,
            SupervisorError::ActorGone(_) => ErrorKind::Spawn,
        }
    }
}
