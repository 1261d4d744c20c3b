//! `run-once enforcement` against thresholds set up to guarantee a specific
//! verdict class, independent of the host's actual CPU load.

use crate::prelude::*;

#[test]
fn a_threshold_far_above_any_real_load_yields_a_pass_verdict() {
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
    daemon
        .cli()
        .args(&["run-once", "enforcement", "--json"])
        .passes()
        .stdout_has(r#""class": "pass""#);

    daemon.stop();
}

#[test]
fn a_threshold_pinned_near_zero_guarantees_a_dissolution_verdict() {
    let mut daemon = Daemon::new();
    daemon.write_config(
        r#"
[[processes]]
name = "echo-loop"
program = "sh"
args = ["-c", "while true; do echo hi; sleep 1; done"]

[thresholds.cpu_pct]
type = "max"
base = 0.0001
bound = 0.0001
"#,
    );
    daemon.start();

    // Warm the sampler — its very first reading can be exactly zero.
    daemon.cli().args(&["run-once", "metrics_sample"]).passes();
    std::thread::sleep(std::time::Duration::from_millis(200));
    daemon.cli().args(&["run-once", "metrics_sample"]).passes();

    daemon
        .cli()
        .args(&["run-once", "enforcement", "--json"])
        .run()
        .code_is(3)
        .stdout_has(r#""class": "dissolution""#);

    daemon.stop();
}

#[test]
fn run_once_on_an_unknown_job_name_fails() {
    let mut daemon = Daemon::new();
    daemon.start();
    daemon.cli().args(&["run-once", "no-such-job"]).fails();
    daemon.stop();
}
