// SPDX-License-Identifier: MIT

//! Cross-cutting error classification.
//!
//! Each crate still defines its own `thiserror` enum for the errors relevant
//! to it — `ErrorKind` is not a replacement for those. It exists so every
//! component-level error can attach a stable classification, letting the
//! audit writer and the CLI's error renderer treat all errors uniformly
//! without matching on crate-specific variants.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad config at startup. Fatal; exit 2.
    Config,
    /// Could not start a child process.
    Spawn,
    /// A metric reading was unavailable; recorded as `unknown`.
    ProbeUnavailable,
    /// A job ran past its deadline and was cancelled.
    DeadlineExceeded,
    /// The audit writer could not persist an event.
    AuditWrite,
    /// A malformed request arrived on the control socket.
    Protocol,
    /// An NL utterance did not resolve to a known intent.
    IntentUnknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config_error",
            ErrorKind::Spawn => "spawn_error",
            ErrorKind::ProbeUnavailable => "probe_unavailable",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::AuditWrite => "audit_write_error",
            ErrorKind::Protocol => "protocol_error",
            ErrorKind::IntentUnknown => "intent_unknown",
        }
    }

    /// Whether this kind is fatal at daemon startup.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, ErrorKind::Config)
    }
}
