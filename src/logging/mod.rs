//! Logging and observability
//!
//! Structured logging with:
//! - pretty or JSON console output
//! - configurable log levels
//! - local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use marketsync::logging::init_logging;
//! use marketsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a sync run
///
/// # Example
///
/// ```no_run
/// use marketsync::log_sync_start;
///
/// log_sync_start!("tracking", 20);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($flow:expr, $lookback_minutes:expr) => {
        tracing::info!(
            flow = %$flow,
            lookback_minutes = $lookback_minutes,
            "Starting sync"
        );
    };
}

/// Log the completion of a sync run
///
/// # Example
///
/// ```no_run
/// use marketsync::log_sync_complete;
/// use std::time::Duration;
///
/// log_sync_complete!("orders", 42, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($flow:expr, $delivered:expr, $duration:expr) => {
        tracing::info!(
            flow = %$flow,
            delivered = $delivered,
            duration_ms = $duration.as_millis() as u64,
            "Sync completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use marketsync::log_error_with_context;
/// use marketsync::domain::SyncError;
///
/// let error = SyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log batch delivery progress
///
/// # Example
///
/// ```no_run
/// use marketsync::log_batch_processing;
///
/// log_batch_processing!(2, 3, 100);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($batch:expr, $total_batches:expr, $size:expr) => {
        tracing::info!(
            batch = $batch,
            total_batches = $total_batches,
            batch_size = $size,
            progress_pct = ($batch as f64 / $total_batches as f64 * 100.0),
            "Sending batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use marketsync::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Timeout after 30s");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_retries:expr, $reason:expr) => {
        tracing::warn!(
            retry = $attempt,
            max_retries = $max_retries,
            reason = %$reason,
            "Delivery failed, retrying with exponential backoff"
        );
    };
}
