use super::*;
use std::time::Duration;
use tempfile::tempdir;
use umcc_core::{FakeClock, ProcessState, ReadinessProbe};
use umcc_storage::AuditLog;

fn echo_loop_spec(name: &str, logs: &std::path::Path) -> ProcessSpec {
    let mut spec = ProcessSpec::new(name, "sh");
    spec.args = vec!["-c".into(), "sleep 5".into()];
    spec.stdout_log = logs.join(format!("{name}.stdout"));
    spec.stderr_log = logs.join(format!("{name}.stderr"));
    spec.stop_grace = Duration::from_millis(200);
    spec
}

fn make_supervisor(dir: &std::path::Path) -> Supervisor {
    let audit_log = std::sync::Arc::new(AuditLog::open(dir, umcc_storage::DEFAULT_ROTATE_BYTES).unwrap());
    let shutdown = tokio_util::sync::CancellationToken::new();
    let (handle, _join) = umcc_storage::spawn_writer(audit_log, shutdown);
    Supervisor::new(dir.join("pids"), FakeClock::new().into(), handle)
}

#[tokio::test]
async fn register_is_idempotent_for_the_same_spec() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let spec = echo_loop_spec("backend", dir.path());
    sup.register(spec.clone()).unwrap();
    sup.register(spec).unwrap();
}

#[tokio::test]
async fn register_rejects_a_conflicting_spec_for_the_same_name() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    sup.register(echo_loop_spec("backend", dir.path())).unwrap();
    let mut other = echo_loop_spec("backend", dir.path());
    other.program = "false".into();
    assert!(matches!(
            sup.register(other),
            Err(SupervisorError::AlreadyRegistered(_))
    ));
}

#[tokio::test]
async fn status_on_unregistered_name_errors() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let err = sup.status(&ProcessName::new("ghost")).await.unwrap_err();
    assert!(matches!(err, SupervisorError::NotRegistered(_)));
}

#[tokio::test]
async fn start_then_stop_transitions_through_the_lifecycle_and_removes_the_pid_file() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let spec = echo_loop_spec("backend", dir.path());
    sup.register(spec.clone()).unwrap();

    let snap = sup.start(&spec.name).await.unwrap();
    assert_eq!(snap.state, ProcessState::Running);
    assert!(snap.pid.is_some());
    let pid_path = dir.path().join("pids").join("backend.pid");
    assert!(pid_path.exists());

    let snap = sup.stop(&spec.name, Duration::from_millis(200)).await.unwrap();
    assert_eq!(snap.state, ProcessState::Stopped);
    assert!(!pid_path.exists());
}

#[tokio::test]
async fn starting_an_already_running_process_is_a_no_op() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let spec = echo_loop_spec("backend", dir.path());
    sup.register(spec.clone()).unwrap();
    let first = sup.start(&spec.name).await.unwrap();
    let second = sup.start(&spec.name).await.unwrap();
    assert_eq!(first.pid, second.pid);
}

#[tokio::test]
async fn quarantined_process_refuses_to_start_until_cleared() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let spec = echo_loop_spec("backend", dir.path());
    sup.register(spec.clone()).unwrap();
    sup.start(&spec.name).await.unwrap();
    sup.quarantine(&spec.name).await.unwrap();

    let err = sup.start(&spec.name).await.unwrap_err();
    assert!(matches!(err, SupervisorError::Quarantined(_)));

    sup.clear(&spec.name).await.unwrap();
    let snap = sup.start(&spec.name).await.unwrap();
    assert_eq!(snap.state, ProcessState::Running);
}

#[tokio::test]
async fn health_check_is_trivially_healthy_without_a_readiness_probe() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let spec = echo_loop_spec("backend", dir.path());
    sup.register(spec.clone()).unwrap();
    sup.start(&spec.name).await.unwrap();

    assert!(sup.health_check(&spec.name).await.unwrap());
    assert_eq!(sup.status(&spec.name).await.unwrap().state, ProcessState::Running);
}

#[tokio::test]
async fn health_check_marks_a_running_process_failed_when_its_probe_stops_answering() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let marker = dir.path().join("ready");
    let mut spec = echo_loop_spec("backend", dir.path());
    spec.readiness = Some(ReadinessProbe::MarkerFile { path: marker.clone() });
    spec.readiness_timeout = Duration::from_millis(500);
    sup.register(spec.clone()).unwrap();

    std::fs::write(&marker, b"ready").unwrap();
    let snap = sup.start(&spec.name).await.unwrap();
    assert_eq!(snap.state, ProcessState::Running);

    // The marker disappears after startup; the next health-probe re-check
    // should observe that and demote the process to `Failed`.
    std::fs::remove_file(&marker).unwrap();
    let healthy = sup.health_check(&spec.name).await.unwrap();
    assert!(!healthy);
    assert_eq!(sup.status(&spec.name).await.unwrap().state, ProcessState::Failed);

    sup.shutdown(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn shutdown_stops_every_registered_process() {
    let dir = tempdir().unwrap();
    let sup = make_supervisor(dir.path());
    let a = echo_loop_spec("a", dir.path());
    let b = echo_loop_spec("b", dir.path());
    sup.register(a.clone()).unwrap();
    sup.register(b.clone()).unwrap();
    sup.start(&a.name).await.unwrap();
    sup.start(&b.name).await.unwrap();

    sup.shutdown(Duration::from_millis(200)).await;

    assert_eq!(sup.status(&a.name).await.unwrap().state, ProcessState::Stopped);
    assert_eq!(sup.status(&b.name).await.unwrap().state, ProcessState::Stopped);
}
