//! `tail-audit` against a state directory populated by a real running
//! daemon: seq filtering and threshold-change visibility.

use crate::prelude::*;

#[test]
fn tail_audit_reports_every_event_from_seq_zero() {
    let mut daemon = Daemon::new();
    daemon.start();

    daemon.cli().args(&["run-once", "metrics_sample"]).passes();

    let tail = daemon.cli().args(&["tail-audit", "--from", "0", "--json"]).passes();
    let stdout = tail.stdout();
    assert!(!stdout.trim().is_empty(), "expected at least one audit event");
    assert!(stdout.lines().next().unwrap().contains(r#""seq":0"#), "first event should carry seq 0: {stdout}");

    daemon.stop();
}

#[test]
fn tail_audit_from_a_high_seq_skips_earlier_events() {
    let mut daemon = Daemon::new();
    daemon.start();

    daemon.cli().args(&["run-once", "metrics_sample"]).passes();
    daemon.cli().args(&["run-once", "metrics_sample"]).passes();

    let all = daemon.cli().args(&["tail-audit", "--from", "0", "--json"]).passes();
    let total = all.stdout().lines().filter(|l| !l.trim().is_empty()).count();
    assert!(total >= 2, "expected at least two audit events, saw {total}");

    let skip_all_but_last = daemon.cli().args(&["tail-audit", "--from", &(total - 1).to_string(), "--json"]).passes();
    let remaining = skip_all_but_last.stdout().lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(remaining, 1, "--from <last seq> should show exactly the final event");

    daemon.stop();
}

#[test]
fn a_threshold_tightening_cycle_leaves_a_threshold_change_event() {
    let mut daemon = Daemon::new();
    daemon.write_config(
        r#"
[[processes]]
name = "echo-loop"
program = "sh"
args = ["-c", "while true; do echo hi; sleep 1; done"]

[thresholds.cpu_pct]
type = "max"
base = 1000.0
bound = 900.0
"#,
    );
    daemon.start();

    daemon.cli().args(&["run-once", "metrics_sample"]).passes();
    daemon.cli().args(&["run-once", "enforcement"]).passes();

    daemon
        .cli()
        .args(&["tail-audit", "--from", "0", "--json"])
        .passes()
        .stdout_has("threshold_change")
        .stdout_has("cpu_pct");

    daemon.stop();
}
