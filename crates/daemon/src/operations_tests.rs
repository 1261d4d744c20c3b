use super::*;
use crate::config::Config;
use crate::daemon::bootstrap;
use std::fs;
use tempfile::tempdir;
use umcc_core::FakeClock;

async fn make_daemon(dir: &std::path::Path) -> std::sync::Arc<Daemon> {
    let config = Config::derive(dir, None);
    fs::create_dir_all(&config.logs_dir).unwrap();
    let bootstrap = bootstrap(config, FakeClock::new().into()).await.unwrap();
    bootstrap.daemon
}

#[tokio::test]
async fn start_then_stop_the_default_process() {
    let dir = tempdir().unwrap();
    let daemon = make_daemon(dir.path()).await;

    let targets = vec!["echo-loop".to_string()];
    let result = start_servers(&daemon, &targets).await;
    assert_eq!(result[0]["started"], serde_json::json!(true));

    let result = stop_servers(&daemon, &targets).await;
    assert_eq!(result[0]["stopped"], serde_json::json!(true));
}

#[tokio::test]
async fn execute_start_servers_operation_emits_a_command_audit_event() {
    let dir = tempdir().unwrap();
    let daemon = make_daemon(dir.path()).await;

    let op = Operation { kind: Intent::StartServers, targets: vec!["echo-loop".to_string()], environment: None };
    let entities = Entities::default();
    execute(&daemon, &op, &entities).await;

    let snapshot = daemon.supervisor().status(&ProcessName::new("echo-loop")).await.unwrap();
    assert_eq!(snapshot.state, umcc_core::ProcessState::Running);
}

#[tokio::test]
async fn unknown_and_help_intents_are_no_ops() {
    let dir = tempdir().unwrap();
    let daemon = make_daemon(dir.path()).await;
    let op = Operation { kind: Intent::Help, targets: Vec::new(), environment: None };
    execute(&daemon, &op, &Entities::default()).await;
}

#[test]
fn make_executable_sets_the_execute_bits() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.sh");
    fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();

    let result = make_executable(&[path.to_string_lossy().to_string()]);
    assert_eq!(result[0]["ok"], serde_json::json!(true));

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn make_executable_reports_failure_for_a_missing_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.sh");
    let result = make_executable(&[path.to_string_lossy().to_string()]);
    assert_eq!(result[0]["ok"], serde_json::json!(false));
}

#[test]
fn create_symlink_needs_exactly_two_resources() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, "hi").unwrap();
    let link = dir.path().join("link.txt");

    let result = create_symlink(&[target.to_string_lossy().to_string(), link.to_string_lossy().to_string()]);
    assert_eq!(result["ok"], serde_json::json!(true));
    assert!(link.is_symlink());
}

#[test]
fn create_symlink_rejects_the_wrong_resource_count() {
    let result = create_symlink(&["only-one".to_string()]);
    assert_eq!(result["ok"], serde_json::json!(false));
}

#[test]
fn create_file_makes_an_empty_file_if_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.txt");
    let result = create_file(&[path.to_string_lossy().to_string()]);
    assert_eq!(result[0]["ok"], serde_json::json!(true));
    assert!(path.exists());
}

#[test]
fn edit_file_appends_without_truncating() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "line one\n").unwrap();
    let result = edit_file(&[path.to_string_lossy().to_string()]);
    assert_eq!(result[0]["ok"], serde_json::json!(true));
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "line one\n");
}

#[tokio::test]
async fn execute_instructions_runs_every_action_in_order() {
    let dir = tempdir().unwrap();
    let daemon = make_daemon(dir.path()).await;
    let path = dir.path().join("doc.txt");

    let doc = InstructionDoc {
        step_id: "step-1".to_string(),
        description: "create then edit a file".to_string(),
        actions: vec![
            ActionSpec {
                kind: Intent::CreateFile,
                targets: Vec::new(),
                resources: vec![path.to_string_lossy().to_string()],
                environment: None,
            },
            ActionSpec {
                kind: Intent::EditFile,
                targets: Vec::new(),
                resources: vec![path.to_string_lossy().to_string()],
                environment: None,
            },
        ],
    };

    execute_instructions(&daemon, &doc).await;
    assert!(path.exists());
}
