//! Configuration schema types
//!
//! This module defines the configuration structure for marketsync.

use crate::adapters::source::DEFAULT_MARKETPLACES;
use crate::config::SecretString;
use crate::core::delivery::{AcceptedStatuses, ClientSettings, RetryPolicy};
use crate::domain::{CanonicalStatus, CompanyId};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound for `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound for `batch_size`
pub const MAX_BATCH_SIZE: usize = 1000;

/// Upper bound for `max_concurrency`
pub const MAX_CONCURRENCY_LIMIT: usize = 16;

/// Main marketsync configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Flow sections are optional; a flow whose section is absent cannot run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketsyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Row source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Tracking-event flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingConfig>,

    /// Order webhook flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<OrdersConfig>,

    /// Extra company name → UUID entries
    #[serde(default)]
    pub companies: BTreeMap<String, String>,

    /// Extra raw → canonical status entries per marketplace
    #[serde(default)]
    pub status: BTreeMap<String, BTreeMap<String, String>>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MarketsyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        if let Some(tracking) = &self.tracking {
            tracking.validate()?;
        }
        if let Some(orders) = &self.orders {
            orders.validate()?;
        }

        for (name, id) in &self.companies {
            if name.trim().is_empty() {
                return Err("companies: company name cannot be empty".to_string());
            }
            CompanyId::new(id).map_err(|e| format!("companies.{name}: {e}"))?;
        }

        for (source, entries) in &self.status {
            for (raw, canonical) in entries {
                CanonicalStatus::from_str(canonical)
                    .map_err(|e| format!("status.{source}.{raw}: {e}"))?;
            }
        }

        self.logging.validate()?;
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Transform only; send nothing
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Row source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// JSON or NDJSON file with source rows
    #[serde(default)]
    pub path: Option<String>,

    /// Marketplaces to include
    #[serde(default = "default_marketplaces")]
    pub marketplaces: Vec<String>,

    /// Timestamp column the lookback window applies to
    #[serde(default)]
    pub lookback_column: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            marketplaces: default_marketplaces(),
            lookback_column: None,
        }
    }
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.marketplaces.iter().any(|m| m.trim().is_empty()) {
            return Err("source.marketplaces cannot contain empty entries".to_string());
        }
        if let Some(path) = &self.path {
            if path.trim().is_empty() {
                return Err("source.path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Tracking-event flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Base URL of the edge-function host
    pub base_url: String,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    pub service_role_key: SecretString,

    /// Path of the tracking function below `base_url`
    #[serde(default = "default_function_path")]
    pub function_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Events per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Requests in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Backoff unit in milliseconds
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Connectivity probe timeout in seconds
    #[serde(default = "default_probe_timeout_seconds")]
    pub probe_timeout_seconds: u64,

    /// Lookback window in minutes
    #[serde(default = "default_tracking_lookback_minutes")]
    pub lookback_minutes: u32,
}

impl TrackingConfig {
    /// Creates a configuration with defaults for everything but the endpoint
    pub fn new(base_url: impl Into<String>, service_role_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            service_role_key,
            function_path: default_function_path(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            batch_size: default_batch_size(),
            max_concurrency: default_max_concurrency(),
            backoff_unit_ms: default_backoff_unit_ms(),
            probe_timeout_seconds: default_probe_timeout_seconds(),
            lookback_minutes: default_tracking_lookback_minutes(),
        }
    }

    /// Full URL of the tracking function
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.function_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Delivery client settings for this flow
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            url: self.endpoint_url(),
            timeout: Duration::from_secs(self.timeout_seconds),
            probe_timeout: Duration::from_secs(self.probe_timeout_seconds),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.backoff_unit_ms),
            ),
            accepted: AcceptedStatuses::OkOnly,
        }
    }

    fn validate(&self) -> Result<(), String> {
        validate_url("tracking.base_url", &self.base_url)?;
        if self.service_role_key.expose_secret().is_empty() {
            return Err("tracking.service_role_key cannot be empty".to_string());
        }
        if self.function_path.trim().is_empty() {
            return Err("tracking.function_path cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("tracking.timeout_seconds must be > 0".to_string());
        }
        if self.probe_timeout_seconds == 0 {
            return Err("tracking.probe_timeout_seconds must be > 0".to_string());
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "tracking.max_retries must be <= {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            ));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "tracking.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            ));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(format!(
                "tracking.max_concurrency must be between 1 and {MAX_CONCURRENCY_LIMIT}, got {}",
                self.max_concurrency
            ));
        }
        if self.lookback_minutes == 0 {
            return Err("tracking.lookback_minutes must be > 0".to_string());
        }
        Ok(())
    }
}

/// Order webhook flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersConfig {
    /// Webhook receiving one order per request
    pub webhook_url: String,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    pub token: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests in flight
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Backoff unit in milliseconds
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Lookback window in minutes
    #[serde(default = "default_orders_lookback_minutes")]
    pub lookback_minutes: u32,
}

impl OrdersConfig {
    /// Creates a configuration with defaults for everything but the endpoint
    pub fn new(webhook_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            token,
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            max_concurrency: default_max_concurrency(),
            backoff_unit_ms: default_backoff_unit_ms(),
            lookback_minutes: default_orders_lookback_minutes(),
        }
    }

    /// Delivery client settings for this flow
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            url: self.webhook_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            probe_timeout: Duration::from_secs(default_probe_timeout_seconds()),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.backoff_unit_ms),
            ),
            accepted: AcceptedStatuses::OkOrCreated,
        }
    }

    fn validate(&self) -> Result<(), String> {
        validate_url("orders.webhook_url", &self.webhook_url)?;
        if self.token.expose_secret().is_empty() {
            return Err("orders.token cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("orders.timeout_seconds must be > 0".to_string());
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "orders.max_retries must be <= {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            ));
        }
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(format!(
                "orders.max_concurrency must be between 1 and {MAX_CONCURRENCY_LIMIT}, got {}",
                self.max_concurrency
            ));
        }
        if self.lookback_minutes == 0 {
            return Err("orders.lookback_minutes must be > 0".to_string());
        }
        Ok(())
    }
}

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "Invalid log format '{other}'. Must be one of: pretty, json"
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console format
    #[serde(default)]
    pub format: LogFormat,

    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("{field} '{value}' is invalid: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "{field} must use http or https, got '{scheme}'"
        )),
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_marketplaces() -> Vec<String> {
    DEFAULT_MARKETPLACES.iter().map(|m| m.to_string()).collect()
}

fn default_function_path() -> String {
    "/functions/v1/process-shipment-tracking".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_batch_size() -> usize {
    100
}

fn default_max_concurrency() -> usize {
    1
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_probe_timeout_seconds() -> u64 {
    10
}

fn default_tracking_lookback_minutes() -> u32 {
    20
}

fn default_orders_lookback_minutes() -> u32 {
    65
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
