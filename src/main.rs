// Marketsync - Marketplace order and shipment sync
// Copyright (c) 2025 Marketsync Contributors
// Licensed under the MIT License

use marketsync::cli::{Cli, Commands, EXIT_CONFIG_ERROR, EXIT_FATAL};
use marketsync::config::{load_config, LoggingConfig, MarketsyncConfig};
use marketsync::core::sync::SyncFlow;
use marketsync::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Configuration errors are reported after logging is up
    let loaded = load_config(&cli.config);

    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Marketsync - marketplace order and shipment sync"
    );

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, config_path = %cli.config, "Failed to load configuration");
            eprintln!("Error: {e}");
            drop(guard);
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let exit_code = match execute_command(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, config: &MarketsyncConfig) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::SyncTracking(args) => args.execute(config, SyncFlow::Tracking).await,
        Commands::SyncOrders(args) => args.execute(config, SyncFlow::Orders).await,
        Commands::CheckConnectivity(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config, config).await,
    }
}
