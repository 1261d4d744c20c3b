use super::*;

#[test]
fn empty_sample_reports_unknown_host_metrics() {
    let sample = MetricSample::empty(0);
    assert_eq!(sample.cpu_pct, Reading::Unknown);
    assert_eq!(sample.reading("cpu_pct"), Some(Reading::Unknown));
}

#[test]
fn reading_resolves_external_metrics_by_name() {
    let mut sample = MetricSample::empty(0);
    sample
    .external_readings
    .insert("coverage_pct".to_string(), Reading::Known(82.5));
    assert_eq!(sample.reading("coverage_pct"), Some(Reading::Known(82.5)));
    assert_eq!(sample.reading("nonexistent"), None);
}

#[test]
fn known_reading_exposes_its_value() {
    assert_eq!(Reading::Known(1.5).value(), Some(1.5));
    assert_eq!(Reading::Unknown.value(), None);
}
