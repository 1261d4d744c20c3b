// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process Supervisor: spawn, watch, and restart
//! heterogeneous long-lived child processes.

pub mod backoff;
mod controller;
mod error;
mod pidfile;
mod process_actor;
mod readiness;
mod supervisor;

pub use controller::ProcessController;
pub use error::SupervisorError;
pub use supervisor::Supervisor;
