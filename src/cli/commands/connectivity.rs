//! Check connectivity command implementation
//!
//! Sends the empty-batch probe to the tracking endpoint and reports how it
//! answered.

use crate::cli::EXIT_CONFIG_ERROR;
use crate::config::MarketsyncConfig;
use crate::core::sync::{tracking_dispatcher, EXIT_ABORTED, EXIT_OK};
use clap::Args;

/// Arguments for the check-connectivity command
#[derive(Args, Debug)]
pub struct ConnectivityArgs {}

impl ConnectivityArgs {
    /// Execute the check-connectivity command
    pub async fn execute(&self, config: &MarketsyncConfig) -> anyhow::Result<i32> {
        let Some(tracking) = &config.tracking else {
            eprintln!("Missing [tracking] section in configuration");
            return Ok(EXIT_CONFIG_ERROR);
        };

        let dispatcher = tracking_dispatcher(tracking)?;
        let outcome = dispatcher.client().probe().await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);

        if outcome.is_reachable() {
            Ok(EXIT_OK)
        } else {
            Ok(EXIT_ABORTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, TrackingConfig};

    #[tokio::test]
    async fn test_missing_tracking_section() {
        let code = ConnectivityArgs {}
            .execute(&MarketsyncConfig::default())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_probe_against_mock_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/functions/v1/process-shipment-tracking")
            .with_status(400)
            .with_body(r#"{"error": "No events provided"}"#)
            .create_async()
            .await;

        let config = MarketsyncConfig {
            tracking: Some(TrackingConfig::new(
                server.url(),
                secret_string("service-key".to_string()),
            )),
            ..MarketsyncConfig::default()
        };
        let code = ConnectivityArgs {}.execute(&config).await.unwrap();

        mock.assert_async().await;
        assert_eq!(code, EXIT_OK);
    }
}
