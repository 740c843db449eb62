//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for marketsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;

/// Marketsync - marketplace order and shipment sync
#[derive(Parser, Debug)]
#[command(name = "marketsync")]
#[command(version, about, long_about = None)]
#[command(author = "Marketsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "marketsync.toml", env = "MARKETSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MARKETSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send recent shipment tracking events to the tracking endpoint
    SyncTracking(commands::sync::SyncArgs),

    /// Send recent orders to the order webhook
    SyncOrders(commands::sync::SyncArgs),

    /// Probe the tracking endpoint without sending events
    CheckConnectivity(commands::connectivity::ConnectivityArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync_tracking() {
        let cli = Cli::parse_from(["marketsync", "sync-tracking"]);
        assert_eq!(cli.config, "marketsync.toml");
        assert!(matches!(cli.command, Commands::SyncTracking(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["marketsync", "--config", "custom.toml", "sync-orders"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::SyncOrders(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["marketsync", "--log-level", "debug", "sync-tracking"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_sync_overrides() {
        let cli = Cli::parse_from([
            "marketsync",
            "sync-orders",
            "--dry-run",
            "--source",
            "rows.ndjson",
            "--lookback-minutes",
            "90",
            "--marketplaces",
            "meli,fala",
        ]);
        let Commands::SyncOrders(args) = cli.command else {
            panic!("expected sync-orders");
        };
        assert!(args.dry_run);
        assert_eq!(args.source.as_deref(), Some("rows.ndjson"));
        assert_eq!(args.lookback_minutes, Some(90));
        assert_eq!(args.marketplaces.as_deref(), Some("meli,fala"));
    }

    #[test]
    fn test_cli_parse_check_connectivity() {
        let cli = Cli::parse_from(["marketsync", "check-connectivity"]);
        assert!(matches!(cli.command, Commands::CheckConnectivity(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["marketsync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
