//! Sync summary and reporting
//!
//! A [`SyncSummary`] describes one invocation from fetch to delivery and is
//! what the CLI prints.

use crate::core::delivery::{DeliveryResult, ProbeOutcome};
use crate::domain::Result;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Exit code for a run that ended `nothing_to_do` or `completed`
pub const EXIT_OK: i32 = 0;

/// Exit code for a run that was `aborted`
pub const EXIT_ABORTED: i32 = 4;

/// Which pipeline ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFlow {
    Tracking,
    Orders,
}

impl SyncFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncFlow::Tracking => "tracking",
            SyncFlow::Orders => "orders",
        }
    }
}

impl fmt::Display for SyncFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No rows, or no valid payloads
    NothingToDo,
    /// Every batch or order was attempted; per-item failures may remain
    Completed,
    /// Source or connectivity failure; nothing was sent
    Aborted,
}

/// Summary of one sync invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    pub flow: SyncFlow,

    pub outcome: SyncOutcome,

    /// Payloads were built but not sent
    pub dry_run: bool,

    /// Rows returned by the source
    pub rows_fetched: usize,

    /// Valid payloads (events or orders)
    pub payloads_built: usize,

    /// Rows or order groups that failed validation
    pub rows_skipped: usize,

    /// Order groups whose rows disagreed on order-level fields
    #[serde(skip_serializing_if = "is_zero")]
    pub order_conflicts: usize,

    /// Connectivity probe result, when a probe ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<ProbeOutcome>,

    /// Delivery counts, when anything was dispatched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryResult>,

    pub duration_ms: u64,

    pub message: String,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl SyncSummary {
    /// Create an empty summary that ends with nothing to do
    pub fn new(flow: SyncFlow, dry_run: bool) -> Self {
        Self {
            flow,
            outcome: SyncOutcome::NothingToDo,
            dry_run,
            rows_fetched: 0,
            payloads_built: 0,
            rows_skipped: 0,
            order_conflicts: 0,
            connectivity: None,
            delivery: None,
            duration_ms: 0,
            message: String::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Ends the run with the given outcome and message
    pub fn finish(mut self, outcome: SyncOutcome, message: impl Into<String>) -> Self {
        self.outcome = outcome;
        self.message = message.into();
        self
    }

    /// HTTP-style status for this outcome
    pub fn http_status(&self) -> u16 {
        match self.outcome {
            SyncOutcome::NothingToDo | SyncOutcome::Completed => 200,
            SyncOutcome::Aborted => 500,
        }
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            SyncOutcome::NothingToDo | SyncOutcome::Completed => EXIT_OK,
            SyncOutcome::Aborted => EXIT_ABORTED,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let (successful, failed) = self
            .delivery
            .as_ref()
            .map_or((0, 0), |d| (d.successful, d.failed));

        match self.outcome {
            SyncOutcome::Aborted => tracing::error!(
                flow = %self.flow,
                rows_fetched = self.rows_fetched,
                duration_ms = self.duration_ms,
                message = %self.message,
                "Sync aborted"
            ),
            _ => tracing::info!(
                flow = %self.flow,
                outcome = ?self.outcome,
                dry_run = self.dry_run,
                rows_fetched = self.rows_fetched,
                payloads_built = self.payloads_built,
                rows_skipped = self.rows_skipped,
                successful = successful,
                failed = failed,
                duration_ms = self.duration_ms,
                "{}",
                self.message
            ),
        }

        if let Some(delivery) = &self.delivery {
            if !delivery.errors.is_empty() {
                tracing::warn!(
                    error_count = delivery.errors.len(),
                    "Sync completed with errors"
                );
                for (i, error) in delivery.errors.iter().enumerate() {
                    tracing::warn!(error_number = i + 1, error = %error, "Delivery error");
                }
            }
        }
    }
}
