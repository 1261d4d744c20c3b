use crate::prelude::*;

#[test]
fn missing_subcommand_fails_with_usage() {
    cli().args(&[]).fails();
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).fails();
}

#[test]
fn down_against_a_state_dir_with_no_daemon_exits_three() {
    let daemon = Daemon::new();
    daemon.cli().args(&["down"]).run().code_is(3);
}

#[test]
fn status_against_a_state_dir_with_no_daemon_still_exits_zero() {
    let daemon = Daemon::new();
    daemon.cli().args(&["status"]).passes().stdout_has("not running");
}

#[test]
fn status_json_against_a_missing_daemon_reports_running_false() {
    let daemon = Daemon::new();
    daemon.cli().args(&["status", "--json"]).passes().stdout_has(r#""running":false"#);
}

#[test]
fn run_once_against_a_missing_daemon_fails() {
    let daemon = Daemon::new();
    daemon.cli().args(&["run-once", "enforcement"]).fails();
}
