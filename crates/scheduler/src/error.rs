// SPDX-License-Identifier: MIT

use thiserror::Error;
use umcc_core::{ErrorKind, JobName};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job already registered: {0}")]
    AlreadyRegistered(JobName),
    #[error("job not registered: {0}")]
    NotRegistered(JobName),
    #[error("job {0} exceeded its deadline")]
    DeadlineExceeded(JobName),
}

impl SchedulerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulerError::AlreadyRegistered(_) | SchedulerError::NotRegistered(_) => {
                ErrorKind::Config
            }
            SchedulerError::DeadlineExceeded(_) => ErrorKind::DeadlineExceeded,
        }
    }
}
