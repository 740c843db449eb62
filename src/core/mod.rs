//! Core business logic for marketsync.
//!
//! # Modules
//!
//! - [`status`] - Raw marketplace status → canonical status
//! - [`transform`] - Row validation and mapping into delivery payloads
//! - [`delivery`] - Batched delivery with retries and the connectivity probe
//! - [`sync`] - Orchestration of one sync invocation
//!
//! # Sync Workflow
//!
//! 1. **Fetch**: Read recent rows from the [`RowSource`](crate::adapters::source::RowSource)
//! 2. **Transform**: Validate and map rows; invalid rows are counted and skipped
//! 3. **Probe** (tracking flow): Abort early if the endpoint is unreachable
//! 4. **Dispatch**: Send batches (or single orders) with bounded retries
//! 5. **Report**: Produce a [`SyncSummary`](sync::SyncSummary)
//!
//! # Example
//!
//! ```rust,no_run
//! use marketsync::adapters::source::{JsonFileSource, RowQuery};
//! use marketsync::config::load_config;
//! use marketsync::core::sync::{tracking_dispatcher, SyncCoordinator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("marketsync.toml")?;
//! let tracking = config.tracking.as_ref().ok_or("no [tracking] section")?;
//!
//! let source = Arc::new(JsonFileSource::new("rows.json"));
//! let coordinator = SyncCoordinator::from_config(&config, source)?;
//! let query = RowQuery::new(tracking.lookback_minutes, config.source.marketplaces.clone());
//!
//! let summary = coordinator
//!     .run_tracking_sync(&query, &tracking_dispatcher(tracking)?)
//!     .await;
//! println!("{}", summary.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod status;
pub mod sync;
pub mod transform;
