use super::*;
use tempfile::tempdir;

#[test]
fn acquire_lock_rejects_a_second_caller() {
    let dir = tempdir().unwrap();
    let config = Config::derive(dir.path(), None);
    std::fs::create_dir_all(&config.state_dir).unwrap();

    let first = acquire_lock(&config).unwrap();
    let second = acquire_lock(&config);
    assert!(matches!(second, Err(ForegroundError::AlreadyRunning { .. })));

    drop(first);
    let third = acquire_lock(&config);
    assert!(third.is_ok());
}

#[test]
fn acquire_lock_writes_the_holder_pid() {
    let dir = tempdir().unwrap();
    let config = Config::derive(dir.path(), None);
    std::fs::create_dir_all(&config.state_dir).unwrap();

    let _lock = acquire_lock(&config).unwrap();
    let contents = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
}
