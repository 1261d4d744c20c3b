// SPDX-License-Identifier: MIT

//! Executes a resolved [`umcc_dispatcher::Operation`] against the live
//! components — the JSON instruction-mode equivalent `up --process-stdin`
//! feeds directly, bypassing classification. Every branch is audited with
//! [`AuditEventKind::Command`].

use crate::daemon::Daemon;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::warn;
use umcc_core::{Clock, ProcessName};
use umcc_dispatcher::{Entities, Intent, Operation};
use umcc_storage::AuditEventKind;

const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(10);

/// One action within an [`InstructionDoc`]: the JSON instruction-mode
/// equivalent of a resolved [`Operation`], read directly off `stdin` instead
/// of produced by NL classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "type")]
    pub kind: Intent,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// A single step of an instruction document: a human-readable description
/// plus the ordered actions it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionDoc {
    pub step_id: String,
    #[serde(default)]
    pub description: String,
    pub actions: Vec<ActionSpec>,
}

/// Executes `op`, resolved from an utterance, against the live components.
/// `entities.resources` supplies the file paths `op.targets` never carries —
/// the dispatcher only folds `services`/`components` into `targets`
///, so file-path intents read `entities` directly.
pub async fn execute(daemon: &Daemon, op: &Operation, entities: &Entities) {
    run_operation(daemon, op, &entities.resources).await;
}

/// Executes every action of every step in `doc`, in order, the same way
/// [`execute`] runs a dispatcher-resolved operation.
pub async fn execute_instructions(daemon: &Daemon, doc: &InstructionDoc) {
    for action in &doc.actions {
        let op = Operation {
            kind: action.kind,
            targets: action.targets.clone(),
            environment: action.environment.clone(),
        };
        run_operation(daemon, &op, &action.resources).await;
    }
}

async fn run_operation(daemon: &Daemon, op: &Operation, resources: &[String]) {
    let now_ms = daemon.clock().epoch_ms();
    let outcome = match op.kind {
        Intent::StartServers => start_servers(daemon, &op.targets).await,
        Intent::StopServers => stop_servers(daemon, &op.targets).await,
        Intent::Deploy => deploy(daemon, &op.targets).await,
        Intent::Cleanup => cleanup(daemon, &op.targets).await,
        Intent::MakeExecutable => make_executable(resources),
        Intent::CreateSymlink => create_symlink(resources),
        Intent::CreateFile => create_file(resources),
        Intent::EditFile => edit_file(resources),
        Intent::Build
        | Intent::InstallDependencies
        | Intent::Configure
        | Intent::SystemStatus
        | Intent::Help
        | Intent::Unknown => json!({ "skipped": true, "reason": "external collaborator, not modeled" }),
    };

    let _ = daemon
    .audit()
    .emit(
        now_ms,
        AuditEventKind::Command,
        "dispatcher",
        json!({ "intent": op.kind.as_str(), "targets": op.targets, "result": outcome }),
    )
    .await;
}

async fn start_servers(daemon: &Daemon, targets: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let name = ProcessName::new(target.as_str());
        let ok = daemon.supervisor().start(&name).await.is_ok();
        results.push(json!({ "target": target, "started": ok }));
    }
    json!(results)
}

async fn stop_servers(daemon: &Daemon, targets: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let name = ProcessName::new(target.as_str());
        let ok = daemon.supervisor().stop(&name, DEFAULT_STOP_GRACE).await.is_ok();
        results.push(json!({ "target": target, "stopped": ok }));
    }
    json!(results)
}

/// Deploy resolves to a restart: the closed taxonomy has no separate
/// "replace the binary" step, so
/// redeploying a managed process means restarting it under its existing
/// spec.
async fn deploy(daemon: &Daemon, targets: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let name = ProcessName::new(target.as_str());
        let ok = daemon.supervisor().restart(&name).await.is_ok();
        results.push(json!({ "target": target, "redeployed": ok }));
    }
    json!(results)
}

async fn cleanup(daemon: &Daemon, targets: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let name = ProcessName::new(target.as_str());
        let ok = daemon.supervisor().stop(&name, DEFAULT_STOP_GRACE).await.is_ok();
        results.push(json!({ "target": target, "cleaned": ok }));
    }
    json!(results)
}

fn make_executable(resources: &[String]) -> serde_json::Value {
    use std::os::unix::fs::PermissionsExt;
    let mut results = Vec::with_capacity(resources.len());
    for path in resources {
        let outcome = std::fs::metadata(path).and_then(|meta| {
                let mut perms = meta.permissions();
                perms.set_mode(perms.mode() | 0o111);
                std::fs::set_permissions(path, perms)
        });
        if let Err(err) = &outcome {
            warn!(path, error = %err, "make_executable failed");
        }
        results.push(json!({ "path": path, "ok": outcome.is_ok() }));
    }
    json!(results)
}

/// `resources` is `[target, link_name]` — the two paths the `create_symlink`
/// keyword match in `entities::resource_re` pulls out in order of
/// appearance in the utterance.
fn create_symlink(resources: &[String]) -> serde_json::Value {
    match resources {
        [target, link] => {
            let outcome = std::os::unix::fs::symlink(target, link);
            if let Err(err) = &outcome {
                warn!(target, link, error = %err, "create_symlink failed");
            }
            json!({ "target": target, "link": link, "ok": outcome.is_ok() })
        }
        _ => json!({ "ok": false, "reason": "expected exactly two resource paths" }),
    }
}

fn create_file(resources: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(resources.len());
    for path in resources {
        let outcome = std::fs::OpenOptions::new().create(true).write(true).open(path);
        if let Err(err) = &outcome {
            warn!(path, error = %err, "create_file failed");
        }
        results.push(json!({ "path": path, "ok": outcome.is_ok() }));
    }
    json!(results)
}

fn edit_file(resources: &[String]) -> serde_json::Value {
    let mut results = Vec::with_capacity(resources.len());
    for path in resources {
        let outcome = std::fs::OpenOptions::new().create(true).append(true).open(path);
        if let Err(err) = &outcome {
            warn!(path, error = %err, "edit_file failed");
        }
        results.push(json!({ "path": path, "ok": outcome.is_ok() }));
    }
    json!(results)
}

#[cfg(test)]
#[path = "operations_tests.rs"]
mod tests;
