use super::*;
use tempfile::tempdir;
use umcc_core::Threshold;

#[test]
fn missing_files_load_as_defaults() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let cycle = store.load_cycle().unwrap();
    let thresholds = store.load_thresholds().unwrap();
    assert_eq!(cycle.cycle_number, 0);
    assert!(thresholds.thresholds.is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());

    let mut cycle = CycleState::new();
    cycle.cycle_number = 3;
    let mut thresholds = ThresholdSet::new();
    thresholds.insert("cpu_pct_max", Threshold::new_max(50.0, 40.0));

    store.save(&cycle, &thresholds).unwrap();

    let loaded_cycle = store.load_cycle().unwrap();
    let loaded_thresholds = store.load_thresholds().unwrap();
    assert_eq!(loaded_cycle.cycle_number, 3);
    assert_eq!(
        loaded_thresholds.get("cpu_pct_max").unwrap().current,
        50.0
    );
}

#[test]
fn save_leaves_no_tmp_files_behind() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.save(&CycleState::new(), &ThresholdSet::new()).unwrap();
    let tmp_exists = fs::read_dir(dir.path())
    .unwrap()
    .filter_map(|e| e.ok())
    .any(|e| e.path().extension().map(|ext| ext == "tmp").unwrap_or(false));
    assert!(!tmp_exists);
}
