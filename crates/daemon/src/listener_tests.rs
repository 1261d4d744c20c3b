use super::*;
use crate::config::Config;
use crate::daemon::bootstrap;
use crate::protocol_wire;
use tempfile::tempdir;
use tokio::net::UnixStream;
use umcc_core::FakeClock;

async fn spawn_serving_daemon(dir: &std::path::Path) -> (Arc<Daemon>, CancellationToken, std::path::PathBuf) {
    let config = Config::derive(dir, None);
    let socket_path = config.socket_path.clone();
    let bootstrap = bootstrap(config, FakeClock::new().into()).await.unwrap();
    let listener = bind(&socket_path).unwrap();
    let shutdown = bootstrap.shutdown.clone();
    let daemon = bootstrap.daemon;
    tokio::spawn(serve(listener, Arc::clone(&daemon), shutdown.clone()));
    (daemon, shutdown, socket_path)
}

async fn roundtrip(socket_path: &std::path::Path, request: Request) -> Response {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    let bytes = protocol_wire::encode(&request).unwrap();
    protocol_wire::write_message(&mut stream, &bytes).await.unwrap();
    let raw = protocol_wire::read_message(&mut stream).await.unwrap();
    protocol_wire::decode(&raw).unwrap()
}

#[tokio::test]
async fn bind_removes_a_stale_socket_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("control.sock");
    std::fs::write(&path, b"stale").unwrap();
    let listener = bind(&path).unwrap();
    drop(listener);
}

#[tokio::test]
async fn status_request_returns_ok_with_a_payload() {
    let dir = tempdir().unwrap();
    let (_daemon, shutdown, socket_path) = spawn_serving_daemon(dir.path()).await;

    let response = roundtrip(&socket_path, Request::Status).await;
    match response {
        Response::Ok { payload } => assert!(payload.get("processes").is_some()),
        Response::Err { .. } => panic!("expected Ok"),
    }

    shutdown.cancel();
}

#[tokio::test]
async fn run_once_on_an_unknown_job_returns_an_error_response() {
    let dir = tempdir().unwrap();
    let (_daemon, shutdown, socket_path) = spawn_serving_daemon(dir.path()).await;

    let response = roundtrip(&socket_path, Request::RunOnce { job: "no-such-job".to_string() }).await;
    assert!(matches!(response, Response::Err { .. }));

    shutdown.cancel();
}

#[tokio::test]
async fn shutdown_request_cancels_the_token() {
    let dir = tempdir().unwrap();
    let (_daemon, shutdown, socket_path) = spawn_serving_daemon(dir.path()).await;

    let response = roundtrip(&socket_path, Request::Shutdown).await;
    assert!(matches!(response, Response::Ok { .. }));
    assert!(shutdown.is_cancelled());
}

#[tokio::test]
async fn ask_request_round_trips_a_dispatch_result() {
    let dir = tempdir().unwrap();
    let (_daemon, shutdown, socket_path) = spawn_serving_daemon(dir.path()).await;

    let response = roundtrip(&socket_path, Request::Ask { utterance: "what is the status".to_string() }).await;
    match response {
        Response::Ok { payload } => assert!(payload.get("intent").is_some()),
        Response::Err { .. } => panic!("expected Ok"),
    }

    shutdown.cancel();
}
