//! Sync coordinator - orchestrates one invocation of a flow
//!
//! fetch → transform → (probe) → dispatch → [`SyncSummary`]

use super::summary::{SyncFlow, SyncOutcome, SyncSummary};
use crate::adapters::company::{CompanyDirectory, CompanyLookup};
use crate::adapters::http::ReqwestTransport;
use crate::adapters::source::{RowQuery, RowSource};
use crate::config::{MarketsyncConfig, OrdersConfig, TrackingConfig};
use crate::core::delivery::{BatchDispatcher, DeliveryClient};
use crate::core::status::{StatusMapping, StatusNormalizer};
use crate::core::transform::{transform_all, transform_orders, EventMapper, OrderMapper};
use crate::domain::{RawRecord, Result};
use crate::{log_error_with_context, log_sync_complete, log_sync_start};
use std::sync::Arc;
use std::time::Instant;

/// Builds the dispatcher for the tracking endpoint
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn tracking_dispatcher(config: &TrackingConfig) -> Result<BatchDispatcher> {
    let transport = ReqwestTransport::new(config.service_role_key.clone())?;
    let client = DeliveryClient::new(Arc::new(transport), config.client_settings());
    Ok(BatchDispatcher::new(Arc::new(client), config.batch_size)
        .with_concurrency(config.max_concurrency))
}

/// Builds the dispatcher for the order webhook
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn order_dispatcher(config: &OrdersConfig) -> Result<BatchDispatcher> {
    let transport = ReqwestTransport::new(config.token.clone())?;
    let client = DeliveryClient::new(Arc::new(transport), config.client_settings());
    // Orders go one per request; batch size only affects logging
    Ok(BatchDispatcher::new(Arc::new(client), 1).with_concurrency(config.max_concurrency))
}

/// Runs sync flows against one row source
pub struct SyncCoordinator {
    source: Arc<dyn RowSource>,
    normalizer: Arc<StatusNormalizer>,
    companies: Arc<dyn CompanyLookup>,
    dry_run: bool,
}

impl SyncCoordinator {
    pub fn new(
        source: Arc<dyn RowSource>,
        normalizer: Arc<StatusNormalizer>,
        companies: Arc<dyn CompanyLookup>,
    ) -> Self {
        Self {
            source,
            normalizer,
            companies,
            dry_run: false,
        }
    }

    /// Transform only; nothing is sent
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builds the status mapping and company directory from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a status or company override is invalid.
    pub fn from_config(config: &MarketsyncConfig, source: Arc<dyn RowSource>) -> Result<Self> {
        let mapping = StatusMapping::builtin()?.with_overrides(&config.status)?;
        let companies = CompanyDirectory::with_entries(&config.companies)?;
        tracing::debug!(
            companies = companies.len(),
            sources = ?mapping.sources(),
            "Lookup tables ready"
        );
        Ok(Self::new(
            source,
            Arc::new(StatusNormalizer::new(mapping)),
            Arc::new(companies),
        )
        .with_dry_run(config.application.dry_run))
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    async fn fetch(&self, query: &RowQuery, summary: &mut SyncSummary) -> Option<Vec<RawRecord>> {
        match self.source.fetch_rows(query).await {
            Ok(rows) => {
                summary.rows_fetched = rows.len();
                Some(rows)
            }
            Err(e) => {
                log_error_with_context!(&e, "Failed to fetch rows");
                summary.message = format!("Failed to fetch rows: {e}");
                None
            }
        }
    }

    /// Runs the tracking-event flow
    ///
    /// The endpoint is probed before the first batch; a failed probe aborts
    /// the run without sending anything.
    pub async fn run_tracking_sync(
        &self,
        query: &RowQuery,
        dispatcher: &BatchDispatcher,
    ) -> SyncSummary {
        let start_time = Instant::now();
        let flow = SyncFlow::Tracking;
        log_sync_start!(flow, query.lookback_minutes);

        let mut summary = SyncSummary::new(flow, self.dry_run);
        let fetched = self.fetch(query, &mut summary).await;
        let summary = match fetched {
            None => {
                let message = summary.message.clone();
                summary.finish(SyncOutcome::Aborted, message)
            }
            Some(rows) if rows.is_empty() => {
                summary.finish(SyncOutcome::NothingToDo, "No tracking events to process")
            }
            Some(rows) => self.deliver_tracking(&rows, dispatcher, summary).await,
        };

        let summary = summary.with_duration(start_time.elapsed());
        log_sync_complete!(
            flow,
            summary.delivery.as_ref().map_or(0, |d| d.successful),
            start_time.elapsed()
        );
        summary.log_summary();
        summary
    }

    async fn deliver_tracking(
        &self,
        rows: &[RawRecord],
        dispatcher: &BatchDispatcher,
        mut summary: SyncSummary,
    ) -> SyncSummary {
        let mapper = EventMapper::new(self.normalizer.clone(), self.companies.clone());
        let outcome = transform_all(rows, &mapper);
        summary.payloads_built = outcome.payloads.len();
        summary.rows_skipped = outcome.skipped;

        if outcome.is_empty() {
            return summary.finish(SyncOutcome::NothingToDo, "No valid tracking events to process");
        }

        if self.dry_run {
            tracing::info!(events = outcome.payloads.len(), "Dry run: skipping delivery");
            let message = format!(
                "Dry run: {} tracking events ready in {} batches",
                outcome.payloads.len(),
                dispatcher.batch_count(outcome.payloads.len())
            );
            return summary.finish(SyncOutcome::Completed, message);
        }

        let probe = dispatcher.client().probe().await;
        let reachable = probe.is_reachable();
        let probe_message = probe.message.clone();
        summary.connectivity = Some(probe);
        if !reachable {
            return summary.finish(
                SyncOutcome::Aborted,
                format!("Connectivity test failed: {probe_message}"),
            );
        }

        let result = dispatcher.dispatch(&outcome.payloads).await;
        let message = format!(
            "Processed {} tracking events: {} successful, {} failed",
            result.total, result.successful, result.failed
        );
        summary.delivery = Some(result);
        summary.finish(SyncOutcome::Completed, message)
    }

    /// Runs the order flow
    ///
    /// Rows are grouped by order id and each order is sent individually.
    pub async fn run_order_sync(&self, query: &RowQuery, dispatcher: &BatchDispatcher) -> SyncSummary {
        let start_time = Instant::now();
        let flow = SyncFlow::Orders;
        log_sync_start!(flow, query.lookback_minutes);

        let mut summary = SyncSummary::new(flow, self.dry_run);
        let fetched = self.fetch(query, &mut summary).await;
        let summary = match fetched {
            None => {
                let message = summary.message.clone();
                summary.finish(SyncOutcome::Aborted, message)
            }
            Some(rows) if rows.is_empty() => {
                summary.finish(SyncOutcome::NothingToDo, "No orders to process")
            }
            Some(rows) => self.deliver_orders(&rows, dispatcher, summary).await,
        };

        let summary = summary.with_duration(start_time.elapsed());
        log_sync_complete!(
            flow,
            summary.delivery.as_ref().map_or(0, |d| d.successful),
            start_time.elapsed()
        );
        summary.log_summary();
        summary
    }

    async fn deliver_orders(
        &self,
        rows: &[RawRecord],
        dispatcher: &BatchDispatcher,
        mut summary: SyncSummary,
    ) -> SyncSummary {
        let mapper = OrderMapper::new(self.normalizer.clone(), self.companies.clone());
        let outcome = transform_orders(rows, &mapper);
        summary.payloads_built = outcome.payloads.len();
        summary.rows_skipped = outcome.skipped;
        summary.order_conflicts = outcome.conflicts;

        if self.dry_run {
            tracing::info!(orders = outcome.payloads.len(), "Dry run: skipping delivery");
            let message = format!("Dry run: {} orders ready", outcome.payloads.len());
            return summary.finish(SyncOutcome::Completed, message);
        }

        let result = dispatcher.dispatch_orders(&outcome.payloads).await;
        let message = format!(
            "Processed {} orders: {} successful, {} failed",
            result.total, result.successful, result.failed
        );
        summary.delivery = Some(result);
        summary.finish(SyncOutcome::Completed, message)
    }
}
