//! Clean start, observe, and stop of a single `umccd` instance.

use crate::prelude::*;

#[test]
fn up_registers_the_default_process_and_down_stops_it_cleanly() {
    let mut daemon = Daemon::new();
    daemon.start();

    let status = daemon.cli().args(&["status", "--json"]).passes();
    let stdout = status.stdout();
    assert!(stdout.contains("echo-loop"), "status did not mention the default process: {stdout}");

    let exit = daemon.stop();
    assert!(exit.map(|s| s.success()).unwrap_or(false), "umcc up did not exit cleanly after down");
}

#[test]
fn a_second_up_against_the_same_state_dir_refuses_to_start() {
    let mut daemon = Daemon::new();
    daemon.start();

    // The second instance should fail to acquire the single-instance lock
    // and exit non-zero rather than racing the first for the control socket.
    let second = daemon.cli().args(&["up"]).run();
    assert_ne!(second.code(), Some(0), "a second `up` against the same state dir should not succeed");

    daemon.stop();
}

#[test]
fn process_stdin_mode_runs_one_instruction_document_and_exits() {
    let daemon = Daemon::new();
    let doc = serde_json::json!({
        "step_id": "smoke",
        "description": "status check via instruction doc",
        "actions": [{ "type": "system_status", "targets": [], "resources": [] }],
    });

    let mut cmd = daemon.cli().args(&["up", "--process-stdin"]).command();
    cmd.stdin(std::process::Stdio::piped());
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    let mut child = cmd.spawn().expect("spawn umcc up --process-stdin");

    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(doc.to_string().as_bytes()).expect("write instruction doc");
    }

    let output = child.wait_with_output().expect("wait for process-stdin run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    // process-stdin never binds a control socket.
    assert!(!daemon.socket_path().exists());
}
