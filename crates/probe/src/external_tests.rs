use super::*;
use std::io::Write;
use tempfile::tempdir;

fn write_marker(path: &std::path::Path, value: f64, timestamp_ms: u64) {
    let mut f = std::fs::File::create(path).unwrap();
    write!(f, r#"{{"value":{value},"timestamp_ms":{timestamp_ms}}}"#).unwrap();
}

#[test]
fn missing_marker_file_reports_unknown() {
    let dir = tempdir().unwrap();
    let markers = ExternalReadings::new(vec![Marker {
                metric: "coverage_pct".into(),
                path: dir.path().join("coverage.json"),
                cadence_ms: 1000,
    }]);
    let readings = markers.read_all(10_000);
    assert_eq!(readings.get("coverage_pct"), Some(&Reading::Unknown));
}

#[test]
fn fresh_marker_reports_known_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coverage.json");
    write_marker(&path, 87.5, 10_000);
    let markers = ExternalReadings::new(vec![Marker {
                metric: "coverage_pct".into(),
                path,
                cadence_ms: 1000,
    }]);
    let readings = markers.read_all(10_500);
    assert_eq!(readings.get("coverage_pct"), Some(&Reading::Known(87.5)));
}

#[test]
fn stale_marker_older_than_twice_cadence_reports_unknown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coverage.json");
    write_marker(&path, 87.5, 1_000);
    let markers = ExternalReadings::new(vec![Marker {
                metric: "coverage_pct".into(),
                path,
                cadence_ms: 1000,
    }]);
    // age = 5000ms > 2 * 1000ms cadence
    let readings = markers.read_all(6_000);
    assert_eq!(readings.get("coverage_pct"), Some(&Reading::Unknown));
}

#[test]
fn marker_exactly_at_twice_cadence_is_still_known() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("build.json");
    write_marker(&path, 42.0, 1_000);
    let markers = ExternalReadings::new(vec![Marker {
                metric: "build_seconds".into(),
                path,
                cadence_ms: 1000,
    }]);
    let readings = markers.read_all(3_000);
    assert_eq!(readings.get("build_seconds"), Some(&Reading::Known(42.0)));
}
