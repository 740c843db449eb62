//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{LogFormat, MarketsyncConfig, OrdersConfig, TrackingConfig};
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MarketsyncConfig
/// 4. Applies environment variable overrides (MARKETSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use marketsync::config::loader::load_config;
///
/// let config = load_config("marketsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MarketsyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text as [`load_config`] does for a file
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn parse_config(contents: &str) -> Result<MarketsyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: MarketsyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SyncError::Configuration(format!("Invalid value for {name}: '{val}'"))),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using MARKETSYNC_* prefix
///
/// Environment variables follow the pattern: MARKETSYNC_<SECTION>_<KEY>,
/// for example MARKETSYNC_TRACKING_BASE_URL or MARKETSYNC_ORDERS_MAX_RETRIES.
/// A flow section absent from the file is created when both of its required
/// keys are supplied through the environment.
fn apply_env_overrides(config: &mut MarketsyncConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("MARKETSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(dry_run) = env_parse("MARKETSYNC_APPLICATION_DRY_RUN")? {
        config.application.dry_run = dry_run;
    }

    // Source overrides
    if let Ok(val) = std::env::var("MARKETSYNC_SOURCE_PATH") {
        config.source.path = Some(val);
    }
    if let Ok(val) = std::env::var("MARKETSYNC_SOURCE_MARKETPLACES") {
        config.source.marketplaces = val
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
    }

    // Tracking overrides
    if config.tracking.is_none() {
        if let (Ok(url), Ok(key)) = (
            std::env::var("MARKETSYNC_TRACKING_BASE_URL"),
            std::env::var("MARKETSYNC_TRACKING_SERVICE_ROLE_KEY"),
        ) {
            config.tracking = Some(TrackingConfig::new(url, secret_string(key)));
        }
    }
    if let Some(ref mut tracking) = config.tracking {
        if let Ok(val) = std::env::var("MARKETSYNC_TRACKING_BASE_URL") {
            tracking.base_url = val;
        }
        if let Ok(val) = std::env::var("MARKETSYNC_TRACKING_SERVICE_ROLE_KEY") {
            tracking.service_role_key = secret_string(val);
        }
        if let Ok(val) = std::env::var("MARKETSYNC_TRACKING_FUNCTION_PATH") {
            tracking.function_path = val;
        }
        if let Some(v) = env_parse("MARKETSYNC_TRACKING_TIMEOUT_SECONDS")? {
            tracking.timeout_seconds = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_TRACKING_MAX_RETRIES")? {
            tracking.max_retries = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_TRACKING_BATCH_SIZE")? {
            tracking.batch_size = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_TRACKING_MAX_CONCURRENCY")? {
            tracking.max_concurrency = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_TRACKING_LOOKBACK_MINUTES")? {
            tracking.lookback_minutes = v;
        }
    }

    // Orders overrides
    if config.orders.is_none() {
        if let (Ok(url), Ok(token)) = (
            std::env::var("MARKETSYNC_ORDERS_WEBHOOK_URL"),
            std::env::var("MARKETSYNC_ORDERS_TOKEN"),
        ) {
            config.orders = Some(OrdersConfig::new(url, secret_string(token)));
        }
    }
    if let Some(ref mut orders) = config.orders {
        if let Ok(val) = std::env::var("MARKETSYNC_ORDERS_WEBHOOK_URL") {
            orders.webhook_url = val;
        }
        if let Ok(val) = std::env::var("MARKETSYNC_ORDERS_TOKEN") {
            orders.token = secret_string(val);
        }
        if let Some(v) = env_parse("MARKETSYNC_ORDERS_TIMEOUT_SECONDS")? {
            orders.timeout_seconds = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_ORDERS_MAX_RETRIES")? {
            orders.max_retries = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_ORDERS_MAX_CONCURRENCY")? {
            orders.max_concurrency = v;
        }
        if let Some(v) = env_parse("MARKETSYNC_ORDERS_LOOKBACK_MINUTES")? {
            orders.lookback_minutes = v;
        }
    }

    // Logging overrides
    if let Some(format) = env_parse::<LogFormat>("MARKETSYNC_LOGGING_FORMAT")? {
        config.logging.format = format;
    }
    if let Some(enabled) = env_parse("MARKETSYNC_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("MARKETSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Serializes tests that touch process environment
    pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const MINIMAL: &str = r#"
[application]
log_level = "info"

[tracking]
base_url = "https://project.supabase.co"
service_role_key = "service-key"

[orders]
webhook_url = "https://hooks.example.com/orders"
token = "order-token"
"#;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("MARKETSYNC_TEST_VAR", "test_value");
        let input = "key = \"${MARKETSYNC_TEST_VAR}\"\n# ${MARKETSYNC_NOT_SET}";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "key = \"test_value\"\n# ${MARKETSYNC_NOT_SET}");
        std::env::remove_var("MARKETSYNC_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("MARKETSYNC_MISSING_VAR");
        let input = "key = \"${MARKETSYNC_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("MARKETSYNC_MISSING_VAR"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        let tracking = config.tracking.unwrap();
        assert_eq!(tracking.base_url, "https://project.supabase.co");
        assert_eq!(tracking.service_role_key.expose_secret(), "service-key");
        assert_eq!(tracking.batch_size, 100);
        assert_eq!(config.orders.unwrap().lookback_minutes, 65);
        assert_eq!(config.source.marketplaces.len(), 4);
    }

    #[test]
    fn test_env_override_applies() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("MARKETSYNC_TRACKING_MAX_RETRIES", "5");
        let config = parse_config(MINIMAL);
        std::env::remove_var("MARKETSYNC_TRACKING_MAX_RETRIES");
        assert_eq!(config.unwrap().tracking.unwrap().max_retries, 5);
    }

    #[test]
    fn test_env_override_unparseable_is_error() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("MARKETSYNC_ORDERS_MAX_RETRIES", "many");
        let result = parse_config(MINIMAL);
        std::env::remove_var("MARKETSYNC_ORDERS_MAX_RETRIES");
        assert!(result.unwrap_err().to_string().contains("MARKETSYNC_ORDERS_MAX_RETRIES"));
    }

    #[test]
    fn test_validation_failure_is_reported() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let content = MINIMAL.replace("[orders]", "[orders]\nmax_retries = 50");
        let err = parse_config(&content).unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));
    }
}
