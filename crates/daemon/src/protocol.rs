// SPDX-License-Identifier: MIT

//! Control-socket request/response types: the same closed
//! vocabulary the CLI's `down`, `status`, `run-once`, `ask` subcommands
//! speak over `control.sock`, framed by [`crate::protocol_wire`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use umcc_core::ErrorKind;

/// Request from a CLI client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// `status [--json]`
    Status,
    /// `down`
    Shutdown,
    /// `run-once <job>`
    RunOnce { job: String },
    /// `ask "<utterance>"`
    Ask { utterance: String },
}

/// Response from the daemon to a CLI client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok { payload: Value },
    Err { kind: &'static str, error: String },
}

impl Response {
    pub fn ok(payload: Value) -> Self {
        Response::Ok { payload }
    }

    pub fn err(kind: ErrorKind, error: impl Into<String>) -> Self {
        Response::Err { kind: kind.as_str(), error: error.into() }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
