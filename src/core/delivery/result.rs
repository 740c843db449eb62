//! Aggregated delivery outcome

use super::client::BatchResponse;
use crate::domain::CanonicalOrder;
use serde::Serialize;

/// Error messages kept per result; older messages win
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Delivery counts for one dispatch
///
/// `successful` and `failed` are endpoint-reported item counts when the
/// endpoint returns a summary, so they need not add up to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    /// Payloads handed to the dispatcher
    pub total: usize,

    /// Items accepted by the endpoint
    pub successful: usize,

    /// Items rejected or lost
    pub failed: usize,

    /// First error messages, at most [`MAX_REPORTED_ERRORS`]
    pub errors: Vec<String>,
}

impl DeliveryResult {
    /// Empty result for `total` payloads
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Appends an error message unless the cap is reached
    pub fn add_error(&mut self, message: impl Into<String>) {
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(message.into());
        }
    }

    /// Accounts for one batch
    ///
    /// `batch_number` is 1-based and only used in the failure message.
    pub fn record_batch(&mut self, batch_number: usize, batch_len: usize, response: &BatchResponse) {
        if !response.success {
            self.failed += batch_len;
            self.add_error(format!("Batch {batch_number}: {}", response.message));
            return;
        }

        match &response.summary {
            Some(summary) => {
                self.successful += summary.created + summary.updated;
                self.failed += summary.errors;
                for message in &summary.details.error_messages {
                    self.add_error(message.clone());
                }
            }
            None => self.successful += batch_len,
        }
    }

    /// Accounts for one individually sent order
    pub fn record_order(&mut self, order: &CanonicalOrder, response: &BatchResponse) {
        if response.success {
            self.successful += 1;
        } else {
            self.failed += 1;
            self.add_error(format!(
                "Order {} ({}): {}",
                order.order, order.market_place, response.message
            ));
        }
    }

    /// Combines the results of two disjoint dispatches
    ///
    /// Counts add up; error lists concatenate and are cut back to the cap.
    pub fn merge(mut self, other: DeliveryResult) -> Self {
        self.total += other.total;
        self.successful += other.successful;
        self.failed += other.failed;
        self.errors.extend(other.errors);
        self.errors.truncate(MAX_REPORTED_ERRORS);
        self
    }

    /// Whether every item was delivered
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::delivery::client::{ResponseDetails, ResponseSummary};

    fn ok(summary: Option<ResponseSummary>) -> BatchResponse {
        BatchResponse {
            success: true,
            message: "Success: 200".to_string(),
            summary,
        }
    }

    fn failed(message: &str) -> BatchResponse {
        BatchResponse {
            success: false,
            message: message.to_string(),
            summary: None,
        }
    }

    #[test]
    fn test_record_batch_with_summary() {
        let mut result = DeliveryResult::new(100);
        result.record_batch(
            1,
            100,
            &ok(Some(ResponseSummary {
                created: 90,
                updated: 5,
                skipped: 3,
                errors: 2,
                details: ResponseDetails {
                    error_messages: vec!["e1".to_string(), "e2".to_string()],
                },
            })),
        );
        assert_eq!(result.successful, 95);
        assert_eq!(result.failed, 2);
        assert_eq!(result.errors, vec!["e1", "e2"]);
    }

    #[test]
    fn test_record_batch_without_summary_counts_whole_batch() {
        let mut result = DeliveryResult::new(50);
        result.record_batch(1, 50, &ok(None));
        assert_eq!(result.successful, 50);
        assert!(result.is_complete_success());
    }

    #[test]
    fn test_record_failed_batch() {
        let mut result = DeliveryResult::new(150);
        result.record_batch(2, 50, &failed("Timeout after 30s"));
        assert_eq!(result.failed, 50);
        assert_eq!(result.errors, vec!["Batch 2: Timeout after 30s"]);
    }

    #[test]
    fn test_error_cap_keeps_oldest() {
        let mut result = DeliveryResult::new(0);
        for i in 0..25 {
            result.add_error(format!("error {i}"));
        }
        assert_eq!(result.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(result.errors[0], "error 0");
        assert_eq!(result.errors[9], "error 9");
    }

    #[test]
    fn test_merge_is_associative() {
        let mut a = DeliveryResult::new(10);
        a.successful = 8;
        a.failed = 2;
        a.add_error("a");
        let mut b = DeliveryResult::new(5);
        b.successful = 5;
        let mut c = DeliveryResult::new(7);
        c.failed = 7;
        for i in 0..12 {
            c.add_error(format!("c{i}"));
        }

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
        assert_eq!(left.total, 22);
        assert_eq!(left.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(left.errors[0], "a");
    }
}
