//! Sync command implementation
//!
//! Implements `sync-tracking` and `sync-orders`: one pass of the chosen flow
//! over the configured row source, with the summary printed as JSON.

use crate::adapters::source::{JsonFileSource, RowQuery};
use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::MarketsyncConfig;
use crate::core::sync::{order_dispatcher, tracking_dispatcher, SyncCoordinator, SyncFlow};
use clap::Args;
use std::sync::Arc;

/// Arguments shared by the sync commands
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Dry run mode - transform rows without sending anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override the row source file
    #[arg(long, value_name = "PATH")]
    pub source: Option<String>,

    /// Override the lookback window in minutes
    #[arg(long)]
    pub lookback_minutes: Option<u32>,

    /// Override marketplaces to include (comma-separated)
    #[arg(long)]
    pub marketplaces: Option<String>,
}

impl SyncArgs {
    /// Execute a sync command for `flow`
    pub async fn execute(&self, config: &MarketsyncConfig, flow: SyncFlow) -> anyhow::Result<i32> {
        tracing::info!(flow = %flow, "Starting sync command");

        let Some(path) = self.source.clone().or_else(|| config.source.path.clone()) else {
            eprintln!("No row source configured: set [source].path or pass --source");
            return Ok(EXIT_CONFIG_ERROR);
        };

        let marketplaces = match &self.marketplaces {
            Some(list) => {
                let list: Vec<String> = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                tracing::info!(marketplaces = ?list, "Overriding marketplaces from CLI");
                list
            }
            None => config.source.marketplaces.clone(),
        };

        let source = Arc::new(
            JsonFileSource::new(path).with_lookback_column(config.source.lookback_column.clone()),
        );
        let dry_run = self.dry_run || config.application.dry_run;
        let coordinator = SyncCoordinator::from_config(config, source)?.with_dry_run(dry_run);

        let summary = match flow {
            SyncFlow::Tracking => {
                let Some(tracking) = &config.tracking else {
                    eprintln!("Missing [tracking] section in configuration");
                    return Ok(EXIT_CONFIG_ERROR);
                };
                let lookback = self.lookback_minutes.unwrap_or(tracking.lookback_minutes);
                let query = RowQuery::new(lookback, marketplaces);
                coordinator
                    .run_tracking_sync(&query, &tracking_dispatcher(tracking)?)
                    .await
            }
            SyncFlow::Orders => {
                let Some(orders) = &config.orders else {
                    eprintln!("Missing [orders] section in configuration");
                    return Ok(EXIT_CONFIG_ERROR);
                };
                let lookback = self.lookback_minutes.unwrap_or(orders.lookback_minutes);
                let query = RowQuery::new(lookback, marketplaces);
                coordinator
                    .run_order_sync(&query, &order_dispatcher(orders)?)
                    .await
            }
        };

        println!("{}", summary.to_json()?);
        Ok(summary.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_source_is_config_error() {
        let args = SyncArgs::default();
        let code = args
            .execute(&MarketsyncConfig::default(), SyncFlow::Tracking)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_missing_flow_section_is_config_error() {
        let args = SyncArgs {
            source: Some("rows.json".to_string()),
            ..SyncArgs::default()
        };
        let code = args
            .execute(&MarketsyncConfig::default(), SyncFlow::Orders)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }
}
