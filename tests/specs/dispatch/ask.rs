//! `ask "<utterance>"` classification and the `--confirm` gate on
//! dissolution-class operations.

use crate::prelude::*;

#[test]
fn a_clear_status_utterance_resolves_to_system_status_and_executes() {
    let mut daemon = Daemon::new();
    daemon.start();

    daemon
        .cli()
        .args(&["ask", "check system status", "--json"])
        .passes()
        .stdout_has(r#""intent": "system_status"#);

    daemon.stop();
}

#[test]
fn a_nonsense_utterance_classifies_as_unknown_and_exits_nonzero() {
    let mut daemon = Daemon::new();
    daemon.start();

    daemon
        .cli()
        .args(&["ask", "purple elephants dream softly", "--json"])
        .fails()
        .stdout_has(r#""intent": "unknown"#);

    daemon.stop();
}

#[test]
fn a_deploy_utterance_without_confirm_is_gated_to_no_operation() {
    let mut daemon = Daemon::new();
    daemon.start();

    daemon
        .cli()
        .args(&["ask", "deploy the new build to production", "--json"])
        .passes()
        .stdout_has(r#""operation": null"#);

    daemon.stop();
}

#[test]
fn the_same_deploy_utterance_with_confirm_yields_an_operation() {
    let mut daemon = Daemon::new();
    daemon.start();

    let result = daemon
        .cli()
        .args(&["ask", "deploy the new build to production --confirm", "--json"])
        .passes();
    let stdout = result.stdout();
    assert!(stdout.contains(r#""intent": "deploy""#), "expected deploy intent: {stdout}");
    assert!(!stdout.contains(r#""operation": null"#), "expected a resolved operation: {stdout}");

    daemon.stop();
}
