// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Audit log and small state store.

mod audit;
mod state;
mod writer;

pub use audit::{AuditDraft, AuditError, AuditEvent, AuditEventKind, AuditLog, DEFAULT_ROTATE_BYTES};
pub use state::{StateError, StateStore};
pub use writer::{spawn_writer, AuditHandle};
