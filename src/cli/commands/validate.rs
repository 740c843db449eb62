//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Loading already
//! validates the file; this command additionally builds the lookup tables and
//! prints what a sync would use.

use crate::adapters::company::CompanyDirectory;
use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::MarketsyncConfig;
use crate::core::status::StatusMapping;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str, config: &MarketsyncConfig) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let mapping = match StatusMapping::builtin().and_then(|m| m.with_overrides(&config.status)) {
            Ok(mapping) => mapping,
            Err(e) => {
                println!("❌ Status mapping is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        let companies = match CompanyDirectory::with_entries(&config.companies) {
            Ok(companies) => companies,
            Err(e) => {
                println!("❌ Company mapping is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            config.source.path.as_deref().unwrap_or("(not set)")
        );
        println!("  Marketplaces: {:?}", config.source.marketplaces);
        match &config.tracking {
            Some(tracking) => {
                println!("  Tracking Endpoint: {}", tracking.endpoint_url());
                println!("  Tracking Batch Size: {}", tracking.batch_size);
                println!("  Tracking Max Retries: {}", tracking.max_retries);
                println!("  Tracking Lookback: {} min", tracking.lookback_minutes);
            }
            None => println!("  Tracking: (not configured)"),
        }
        match &config.orders {
            Some(orders) => {
                println!("  Order Webhook: {}", orders.webhook_url);
                println!("  Order Max Retries: {}", orders.max_retries);
                println!("  Order Lookback: {} min", orders.lookback_minutes);
            }
            None => println!("  Orders: (not configured)"),
        }
        println!("  Companies: {:?}", companies.names());
        println!("  Status Tables: {:?}", mapping.sources());
        println!();
        Ok(0)
    }
}
