// Marketsync - Marketplace order and shipment sync
// Copyright (c) 2025 Marketsync Contributors
// Licensed under the MIT License

//! # Marketsync - marketplace order and shipment sync
//!
//! Marketsync reads recent order and shipment rows exported from marketplace
//! integrations, normalizes them into canonical payloads and delivers them to
//! HTTP endpoints.
//!
//! ## Overview
//!
//! This library provides:
//! - **Normalizing** raw marketplace statuses into one canonical set
//! - **Validating** rows and mapping them into tracking events or orders
//! - **Delivering** payloads in batches with timeouts and bounded retries
//! - **Reporting** each run as a JSON summary
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (status, transform, delivery, sync)
//! - [`adapters`] - Row sources, company lookup, HTTP transport
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Status Normalization
//!
//! ```rust
//! use marketsync::core::status::{StatusMapping, StatusNormalizer};
//! use marketsync::domain::CanonicalStatus;
//!
//! # fn example() -> marketsync::domain::Result<()> {
//! let normalizer = StatusNormalizer::new(StatusMapping::builtin()?);
//! assert_eq!(normalizer.normalize("Shipped", "MELI"), CanonicalStatus::Dispatched);
//! assert_eq!(normalizer.normalize("¿?", "meli"), CanonicalStatus::Pending);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`], whose error is [`domain::SyncError`]:
//!
//! ```rust,no_run
//! use marketsync::domain::SyncError;
//!
//! fn example() -> Result<(), SyncError> {
//!     let config = marketsync::config::load_config("marketsync.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! Row-level validation problems never fail a run; they are counted and
//! logged. Delivery problems are retried, then recorded in the
//! [`DeliveryResult`](core::delivery::DeliveryResult).
//!
//! ## Logging
//!
//! Marketsync uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(flow = "tracking", "Starting sync");
//! warn!(row = "2000001", field = "event_timestamp", "Skipping invalid row");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
