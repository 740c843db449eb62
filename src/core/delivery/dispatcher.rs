//! Batch dispatch
//!
//! Splits payloads into fixed-size batches and sends them through a
//! [`DeliveryClient`]. Up to `max_concurrency` requests may be in flight, but
//! responses are merged in batch order, so counts, error lists and logs do
//! not depend on completion order.

use super::client::DeliveryClient;
use super::result::DeliveryResult;
use crate::domain::CanonicalOrder;
use crate::log_batch_processing;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Default number of payloads per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

pub struct BatchDispatcher {
    client: Arc<DeliveryClient>,
    batch_size: usize,
    max_concurrency: usize,
}

impl BatchDispatcher {
    /// Creates a sequential dispatcher
    pub fn new(client: Arc<DeliveryClient>, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
            max_concurrency: 1,
        }
    }

    /// Allows up to `max_concurrency` requests in flight
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn client(&self) -> &DeliveryClient {
        &self.client
    }

    /// Number of batches `count` payloads are split into
    pub fn batch_count(&self, count: usize) -> usize {
        count.div_ceil(self.batch_size)
    }

    /// Delivers payloads in batches of at most `batch_size`
    ///
    /// Every batch is attempted. An empty input makes no request.
    pub async fn dispatch<T: Serialize + Sync>(&self, payloads: &[T]) -> DeliveryResult {
        if payloads.is_empty() {
            tracing::info!("No events to send");
            return DeliveryResult::new(0);
        }

        let total_batches = self.batch_count(payloads.len());
        tracing::info!(
            events = payloads.len(),
            batches = total_batches,
            batch_size = self.batch_size,
            max_concurrency = self.max_concurrency,
            "Dispatching batches"
        );

        let client = &self.client;
        let batch_results: Vec<DeliveryResult> =
            stream::iter(payloads.chunks(self.batch_size).enumerate())
                .map(|(index, batch)| async move {
                    log_batch_processing!(index + 1, total_batches, batch.len());
                    let response = client.send_batch(batch).await;
                    let mut batch_result = DeliveryResult::new(batch.len());
                    batch_result.record_batch(index + 1, batch.len(), &response);
                    batch_result
                })
                .buffered(self.max_concurrency)
                .collect()
                .await;

        let result = batch_results
            .into_iter()
            .fold(DeliveryResult::new(0), DeliveryResult::merge);

        tracing::info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            "Batch dispatch completed"
        );
        result
    }

    /// Delivers each order as its own request
    pub async fn dispatch_orders(&self, orders: &[CanonicalOrder]) -> DeliveryResult {
        let mut result = DeliveryResult::new(orders.len());
        if orders.is_empty() {
            tracing::info!("No orders to send");
            return result;
        }

        let client = &self.client;
        let responses: Vec<_> = stream::iter(orders.iter())
            .map(|order| async move { client.send_order(order).await })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        for (order, response) in orders.iter().zip(&responses) {
            if response.success {
                tracing::debug!(order_id = %order.order, "Order delivered");
            }
            result.record_order(order, response);
        }

        tracing::info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            "Order dispatch completed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::TransportResponse;
    use crate::core::delivery::client::testing::{settings, ScriptedTransport};
    use crate::core::delivery::client::AcceptedStatuses;
    use crate::domain::CanonicalStatus;
    use std::collections::BTreeMap;

    fn dispatcher(transport: Arc<ScriptedTransport>, batch_size: usize) -> BatchDispatcher {
        let client = DeliveryClient::new(transport, settings(AcceptedStatuses::OkOnly));
        BatchDispatcher::new(Arc::new(client), batch_size)
    }

    fn order(id: &str) -> CanonicalOrder {
        CanonicalOrder {
            order: id.to_string(),
            shipping_id: None,
            status: "paid".to_string(),
            canonical_status: CanonicalStatus::Pending,
            shipping_status: None,
            logistic_type: None,
            market_place: "meli".to_string(),
            company_id: None,
            order_created_at: "2024-01-01T00:00:00-03:00".to_string(),
            shipping_promise_date: None,
            sku: BTreeMap::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_dispatch_makes_no_request() {
        let transport = ScriptedTransport::new(vec![]);
        let result = dispatcher(transport.clone(), 100)
            .dispatch::<u32>(&[])
            .await;
        assert_eq!(result, DeliveryResult::new(0));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_250_payloads_make_three_batches() {
        let transport = ScriptedTransport::new(vec![]);
        let payloads: Vec<u32> = (0..250).collect();
        let result = dispatcher(transport.clone(), 100)
            .dispatch(&payloads)
            .await;

        let requests = transport.requests.lock().unwrap();
        let sizes: Vec<usize> = requests
            .iter()
            .map(|r| r["events"].as_array().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(requests[2]["events"][0], 200);
        assert_eq!(result.total, 250);
        assert_eq!(result.successful, 250);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_does_not_stop_later_batches() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(200, "")),
            Ok(TransportResponse::new(400, "bad payload")),
            Ok(TransportResponse::new(200, r#"{"created": 1, "updated": 0}"#)),
        ]);
        let payloads: Vec<u32> = (0..5).collect();
        let result = dispatcher(transport.clone(), 2).dispatch(&payloads).await;

        assert_eq!(transport.request_count(), 3);
        assert_eq!(result.successful, 3);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors, vec!["Batch 2: Failed: 400 - bad payload"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_json_object_counts_whole_batch() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(200, "{}"))]);
        let payloads: Vec<u32> = (0..3).collect();
        let result = dispatcher(transport, 100).dispatch(&payloads).await;

        assert_eq!(result.total, 3);
        assert_eq!(result.successful, 3);
        assert_eq!(result.failed, 0);
        assert!(result.is_complete_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_dispatch_merges_in_order() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(500, "a")),
            Ok(TransportResponse::new(401, "b")),
            Ok(TransportResponse::new(401, "c")),
        ]);
        let payloads: Vec<u32> = (0..3).collect();
        let result = dispatcher(transport, 1)
            .with_concurrency(4)
            .dispatch(&payloads)
            .await;

        // Whichever batch drew the 500 succeeds on retry
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors.len(), 2);
        // Batch numbering follows input order regardless of completion order
        let numbers: Vec<&str> = result
            .errors
            .iter()
            .map(|e| e.split(':').next().unwrap())
            .collect();
        let mut sorted = numbers.clone();
        sorted.sort();
        assert_eq!(numbers, sorted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_orders_counts_each_order() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(200, "")),
            Ok(TransportResponse::new(409, "duplicate")),
        ]);
        let orders = vec![order("1"), order("2")];
        let result = dispatcher(transport.clone(), 100)
            .dispatch_orders(&orders)
            .await;

        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests.lock().unwrap()[1]["order"], "2");
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, vec!["Order 2 (meli): Failed: 409 - duplicate"]);
    }

    #[test]
    fn test_batch_count() {
        let transport = ScriptedTransport::new(vec![]);
        let dispatcher = dispatcher(transport, 100);
        assert_eq!(dispatcher.batch_count(0), 0);
        assert_eq!(dispatcher.batch_count(100), 1);
        assert_eq!(dispatcher.batch_count(101), 2);
    }
}
