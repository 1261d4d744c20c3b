use super::*;
use serde_json::json;

#[test]
fn format_duration_ms_uses_the_coarsest_fitting_unit() {
    assert_eq!(format_duration_ms(5_000), "5s");
    assert_eq!(format_duration_ms(125_000), "2m5s");
    assert_eq!(format_duration_ms(3 * 3_600_000 + 90_000), "3h1m");
}

#[test]
fn print_status_does_not_panic_on_a_minimal_payload() {
    let payload = json!({
            "uptime_ms": 1000,
            "cycle_number": 2,
            "factor": 0.95,
            "audit_healthy": true,
            "processes": [],
            "last_verdict": null,
    });
    print_status(&payload, OutputFormat::Text);
    print_status(&payload, OutputFormat::Json);
}

#[test]
fn print_verdict_does_not_panic_on_a_breach_list() {
    let verdict = json!({
            "seq": 3,
            "class": "violation",
            "breaches": [{"metric": "cpu_pct", "observed": 60.0, "threshold": 50.0, "delta": 10.0, "relative_delta": 0.2, "critical": false}],
    });
    print_verdict(&verdict, OutputFormat::Text);
    print_verdict(&verdict, OutputFormat::Json);
}

#[test]
fn print_ask_handles_a_null_operation() {
    let payload = json!({ "utterance": "rm -rf /", "intent": "unknown", "confidence": 0.1, "entities": {}, "operation": null });
    print_ask(&payload, OutputFormat::Text);
}

#[test]
fn print_run_once_reads_the_outcome_field() {
    let payload = json!({ "job": "metrics_sample", "outcome": "completed" });
    print_run_once("metrics_sample", &payload, OutputFormat::Text);
}
