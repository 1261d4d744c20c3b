use super::*;

#[test]
fn job_spec_defaults_to_skip_overlap_policy() {
    let spec = JobSpec::new("enforcement", Duration::from_secs(7200), Duration::from_secs(240));
    assert_eq!(spec.overlap_policy, OverlapPolicy::Skip);
}

#[test]
fn job_runtime_default_has_no_history() {
    let rt = JobRuntime::default();
    assert!(rt.last_fired_ms.is_none());
    assert!(!rt.running);
    assert_eq!(rt.consecutive_failures, 0);
}
