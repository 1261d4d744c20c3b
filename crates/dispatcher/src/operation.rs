// SPDX-License-Identifier: MIT

//! Resolution of a classified [`Intent`] plus extracted [`Entities`] into a
//! concrete, closed [`Operation`]. The JSON instruction
//! mode (`up --process-stdin`) executes the same closed set of `type` values
//! directly, without going through classification.

use crate::entities::Entities;
use crate::intent::Intent;
use serde::{Deserialize, Serialize};

/// Managed processes started by default targets resolve to when an
/// utterance names none explicitly.
pub const DEFAULT_TARGETS: &[&str] = &["backend", "frontend", "proxy"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: Intent,
    pub targets: Vec<String>,
    pub environment: Option<String>,
}

impl Operation {
    fn new(kind: Intent) -> Self {
        Self { kind, targets: Vec::new(), environment: None }
    }
}

/// Intents whose targets default to every managed process when the
/// utterance names none.
fn defaults_to_all_targets(intent: Intent) -> bool {
    matches!(
        intent,
        Intent::Build | Intent::InstallDependencies | Intent::StartServers | Intent::StopServers
    )
}

/// Resolves a classified intent to a concrete [`Operation`], pulling
/// parameters from `entities` and falling back to stated defaults.
/// `Unknown` never resolves — dispatch only ever sees operations already
/// in the closed set.
pub fn resolve(intent: Intent, entities: &Entities) -> Option<Operation> {
    if matches!(intent, Intent::Unknown) {
        return None;
    }

    let mut op = Operation::new(intent);
    op.targets = entities
    .services
    .iter()
    .chain(entities.components.iter())
    .cloned()
    .collect();
    op.environment = entities.environments.first().cloned();

    if op.targets.is_empty() && defaults_to_all_targets(intent) {
        op.targets = DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect();
    }

    Some(op)
}
