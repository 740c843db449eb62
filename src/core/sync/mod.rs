//! Sync orchestration
//!
//! - [`coordinator`] - runs one flow from fetch to delivery
//! - [`summary`] - the [`SyncSummary`] reported for each run

pub mod coordinator;
pub mod summary;

pub use coordinator::{order_dispatcher, tracking_dispatcher, SyncCoordinator};
pub use summary::{SyncFlow, SyncOutcome, SyncSummary, EXIT_ABORTED, EXIT_OK};
