//! Integration tests for logging functionality

use marketsync::config::{LogFormat, LoggingConfig};
use marketsync::domain::DeliveryError;
use marketsync::logging::init_logging;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

// The global subscriber can only be installed once per process, so every
// init_logging assertion lives in this one test.
#[test]
fn test_init_logging_creates_directory_and_rejects_second_init() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        format: LogFormat::Json,
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    assert!(init_logging("loud", &config).is_err());

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    tracing::info!(flow = "tracking", "written to the file log");

    let second = init_logging("info", &LoggingConfig::default());
    assert!(second.is_err());

    drop(guard);
    let written: Vec<_> = std::fs::read_dir(&log_path).unwrap().collect();
    assert!(!written.is_empty());
}

#[test]
fn test_logging_macros_usage() {
    // The macros expand to plain tracing events; without a subscriber
    // they are no-ops
    let error = DeliveryError::Timeout(30);

    marketsync::log_sync_start!("tracking", 20);
    marketsync::log_batch_processing!(1, 3, 100);
    marketsync::log_retry_attempt!(2, 3, &error);
    marketsync::log_error_with_context!(&error, "Batch delivery failed");
    marketsync::log_sync_complete!("orders", 42, Duration::from_secs(10));

    assert_eq!(error.to_string(), "Timeout after 30s");
}
