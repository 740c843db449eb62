//! Configuration management for marketsync.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Marketsync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MARKETSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use marketsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("marketsync.toml")?;
//!
//! if let Some(tracking) = &config.tracking {
//!     println!("Tracking endpoint: {}", tracking.endpoint_url());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`SourceConfig`] - Where rows come from and which marketplaces to keep
//! - [`TrackingConfig`] - Tracking-event endpoint, batching and retries
//! - [`OrdersConfig`] - Order webhook and retries
//! - `companies` / `status` - Extra company and status mapping entries
//! - [`LoggingConfig`] - Console format and optional file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! path = "./rows.json"
//! marketplaces = ["meli", "fala", "walm", "cenc"]
//!
//! [tracking]
//! base_url = "https://project.supabase.co"
//! service_role_key = "${SUPABASE_SERVICE_ROLE_KEY}"
//! batch_size = 100
//!
//! [orders]
//! webhook_url = "https://hooks.example.com/orders"
//! token = "${ORDER_WEBHOOK_TOKEN}"
//!
//! [companies]
//! acme = "0b8f6a57-8d0e-4a5f-9a9e-3d3f3c1b2a10"
//!
//! [status.meli]
//! returned_to_sender = "returned"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, LogFormat, LoggingConfig, MarketsyncConfig, OrdersConfig, SourceConfig,
    TrackingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
