use shipthis_rs::telemetry::init_telemetry;

#[test]
fn test_init_telemetry_creates_log_dir() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let guard = init_telemetry(&log_dir).unwrap();
    tracing::info!("telemetry smoke test");
    drop(guard);

    assert!(log_dir.join("shipthis.log").exists());

    // A second global subscriber is refused rather than silently replacing the first
    assert!(init_telemetry(&log_dir).is_err());
}
