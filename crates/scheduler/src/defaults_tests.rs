use super::*;

#[test]
fn default_job_specs_match_the_spec_table() {
    let specs = default_job_specs();
    assert_eq!(specs.len(), 5);

    let enforcement = specs
    .iter()
    .find(|s| s.name.as_str() == ENFORCEMENT)
    .unwrap();
    assert_eq!(enforcement.cadence, Duration::from_secs(2 * 60 * 60));
    assert_eq!(enforcement.deadline, Duration::from_secs(4 * 60));

    let tick = specs
    .iter()
    .find(|s| s.name.as_str() == SUPERVISOR_TICK)
    .unwrap();
    assert_eq!(tick.cadence, Duration::from_secs(10));
    assert_eq!(tick.deadline, Duration::from_secs(8));
}
