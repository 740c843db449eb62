//! Delivery client: one request per batch (or order) with retry, plus the
//! connectivity probe.

use super::retry::RetryPolicy;
use crate::adapters::http::{DeliveryTransport, TransportResponse};
use crate::domain::{CanonicalOrder, DeliveryError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of response body characters carried into messages
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Status codes treated as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedStatuses {
    /// 200 only (tracking endpoint)
    OkOnly,
    /// 200 or 201 (order webhook)
    OkOrCreated,
}

impl AcceptedStatuses {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            AcceptedStatuses::OkOnly => status == 200,
            AcceptedStatuses::OkOrCreated => status == 200 || status == 201,
        }
    }
}

/// Endpoint and timing settings of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub url: String,
    pub timeout: Duration,
    pub probe_timeout: Duration,
    pub retry: RetryPolicy,
    pub accepted: AcceptedStatuses,
}

/// Per-item counts reported by the tracking endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSummary {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub updated: usize,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub details: ResponseDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetails {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

/// Terminal outcome of one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse {
    pub success: bool,
    pub message: String,
    /// Parsed body of a successful JSON response
    pub summary: Option<ResponseSummary>,
}

impl BatchResponse {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            summary: None,
        }
    }
}

/// Classification of a probe response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// 400: the endpoint rejected the empty batch as expected
    ValidationRejected,
    /// Any other HTTP status
    Unclassified,
    /// 401
    AuthenticationFailed,
    /// 404
    EndpointNotFound,
    /// No HTTP response at all
    Unreachable,
}

/// Result of the connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub status: ProbeStatus,
    pub http_status: Option<u16>,
    pub message: String,
}

impl ProbeOutcome {
    /// Whether delivery should proceed
    pub fn is_reachable(&self) -> bool {
        matches!(
            self.status,
            ProbeStatus::ValidationRejected | ProbeStatus::Unclassified
        )
    }

    fn from_response(response: &TransportResponse) -> Self {
        let body = excerpt(&response.body);
        let (status, message) = match response.status {
            400 => (
                ProbeStatus::ValidationRejected,
                format!("Connectivity OK - Got expected validation error (400): {body}"),
            ),
            401 => (
                ProbeStatus::AuthenticationFailed,
                DeliveryError::AuthenticationFailed(body).to_string(),
            ),
            404 => (
                ProbeStatus::EndpointNotFound,
                DeliveryError::EndpointNotFound(body).to_string(),
            ),
            other => (
                ProbeStatus::Unclassified,
                format!("Connectivity OK - Got response ({other}): {body}"),
            ),
        };
        Self {
            status,
            http_status: Some(response.status),
            message,
        }
    }

    fn from_error(err: &DeliveryError) -> Self {
        let message = match err {
            DeliveryError::ConnectionFailed(e) => format!("Connection failed: {e}"),
            DeliveryError::Timeout(_) => "Request timed out".to_string(),
            other => format!("Test failed: {other}"),
        };
        Self {
            status: ProbeStatus::Unreachable,
            http_status: None,
            message,
        }
    }
}

/// Sends payloads to one endpoint
pub struct DeliveryClient {
    transport: Arc<dyn DeliveryTransport>,
    settings: ClientSettings,
}

impl DeliveryClient {
    pub fn new(transport: Arc<dyn DeliveryTransport>, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Sends one batch as `{"events": [...]}`
    pub async fn send_batch<T: Serialize>(&self, payloads: &[T]) -> BatchResponse {
        let events = match serde_json::to_value(payloads) {
            Ok(events) => events,
            Err(e) => return BatchResponse::failed(format!("Serialization error: {e}")),
        };
        self.deliver(&json!({ "events": events }), payloads.len())
            .await
    }

    /// Sends one order as the request body
    pub async fn send_order(&self, order: &CanonicalOrder) -> BatchResponse {
        match serde_json::to_value(order) {
            Ok(body) => self.deliver(&body, 1).await,
            Err(e) => BatchResponse::failed(format!("Serialization error: {e}")),
        }
    }

    /// Checks that the endpoint is reachable and accepts the credentials
    ///
    /// Sends an empty batch, which a healthy endpoint rejects with 400.
    pub async fn probe(&self) -> ProbeOutcome {
        tracing::info!(url = %self.settings.url, "Testing endpoint connectivity");
        let outcome = match self
            .transport
            .post_json(
                &self.settings.url,
                &json!({ "events": [] }),
                self.settings.probe_timeout,
            )
            .await
        {
            Ok(response) => ProbeOutcome::from_response(&response),
            Err(e) => ProbeOutcome::from_error(&e),
        };

        if outcome.is_reachable() {
            tracing::info!(status = ?outcome.status, message = %outcome.message, "Connectivity check passed");
        } else {
            tracing::error!(status = ?outcome.status, message = %outcome.message, "Connectivity check failed");
        }
        outcome
    }

    async fn deliver(&self, body: &Value, items: usize) -> BatchResponse {
        let transport = &self.transport;
        let url = self.settings.url.as_str();
        let timeout = self.settings.timeout;
        let accepted = self.settings.accepted;

        let result = self
            .settings
            .retry
            .run(|attempt| async move {
                tracing::debug!(url = url, items = items, attempt = attempt, "Sending request");
                let response = transport.post_json(url, body, timeout).await?;
                tracing::debug!(
                    status = response.status,
                    body = %excerpt(&response.body),
                    "Endpoint response"
                );
                if accepted.accepts(response.status) {
                    Ok(response)
                } else {
                    Err(DeliveryError::UnexpectedStatus {
                        status: response.status,
                        body: excerpt(&response.body),
                    })
                }
            })
            .await;

        match result {
            Ok(response) => BatchResponse {
                success: true,
                message: format!("Success: {}", response.status),
                summary: parse_summary(&response.body),
            },
            Err(e) => {
                tracing::error!(url = url, items = items, error = %e, "Delivery failed");
                BatchResponse::failed(e.to_string())
            }
        }
    }
}

/// Parses the endpoint's per-item counts
///
/// A body that carries none of the count keys (including `{}`) is not a
/// summary; the caller then counts the whole batch as delivered.
fn parse_summary(body: &str) -> Option<ResponseSummary> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    if !SUMMARY_COUNT_KEYS.iter().any(|key| object.contains_key(*key)) {
        return None;
    }
    serde_json::from_value(value).ok()
}

const SUMMARY_COUNT_KEYS: [&str; 3] = ["created", "updated", "errors"];

/// First [`BODY_EXCERPT_CHARS`] characters of a body
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}


#[cfg(test)]
mod tests {
    use super::testing::{settings, ScriptedTransport};
    use super::*;
    use tokio::time::Instant;

    fn client(transport: Arc<ScriptedTransport>, accepted: AcceptedStatuses) -> DeliveryClient {
        DeliveryClient::new(transport, settings(accepted))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_with_summary() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(
            200,
            r#"{"created": 2, "updated": 1, "errors": 1, "details": {"error_messages": ["bad row"]}}"#,
        ))]);
        let response = client(transport.clone(), AcceptedStatuses::OkOnly)
            .send_batch(&[1, 2, 3, 4])
            .await;

        assert!(response.success);
        assert_eq!(response.message, "Success: 200");
        let summary = response.summary.unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.details.error_messages, vec!["bad row"]);
        assert_eq!(transport.requests.lock().unwrap()[0]["events"][3], 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_json_success_has_no_summary() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(200, "OK"))]);
        let response = client(transport, AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;
        assert!(response.success);
        assert!(response.summary.is_none());
    }

    #[test]
    fn test_summary_requires_a_count_key() {
        assert_eq!(parse_summary("{}"), None);
        assert_eq!(parse_summary(r#"{"success": true}"#), None);
        assert_eq!(parse_summary("[]"), None);

        let summary = parse_summary(r#"{"errors": 2}"#).unwrap();
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.created, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_then_success_backs_off() {
        let transport = ScriptedTransport::new(vec![
            Err(DeliveryError::Timeout(30)),
            Err(DeliveryError::Timeout(30)),
            Ok(TransportResponse::new(200, "{}")),
        ]);
        let started = Instant::now();
        let response = client(transport.clone(), AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;

        assert!(response.success);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_exhaust_retries() {
        let transport = ScriptedTransport::new(vec![
            Ok(TransportResponse::new(503, "busy")),
            Ok(TransportResponse::new(503, "busy")),
            Ok(TransportResponse::new(503, "busy")),
            Ok(TransportResponse::new(503, "still busy")),
        ]);
        let started = Instant::now();
        let response = client(transport.clone(), AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;

        assert!(!response.success);
        assert_eq!(response.message, "Failed: 503 - still busy");
        assert_eq!(transport.request_count(), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_terminal_and_truncated() {
        let body = "x".repeat(500);
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(422, body))]);
        let response = client(transport.clone(), AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;

        assert!(!response.success);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(response.message, format!("Failed: 422 - {}", "x".repeat(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exhaustion_message() {
        let transport = ScriptedTransport::new(vec![Err(DeliveryError::Timeout(30)); 4]);
        let response = client(transport, AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;
        assert_eq!(response.message, "Timeout after 30s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_created_accepted_only_for_orders() {
        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(201, ""))]);
        let response = client(transport, AcceptedStatuses::OkOnly)
            .send_batch(&["a"])
            .await;
        assert!(!response.success);

        let transport = ScriptedTransport::new(vec![Ok(TransportResponse::new(201, ""))]);
        let response = client(transport, AcceptedStatuses::OkOrCreated)
            .send_batch(&["a"])
            .await;
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_probe_classification() {
        let cases = vec![
            (400, ProbeStatus::ValidationRejected, true),
            (401, ProbeStatus::AuthenticationFailed, false),
            (404, ProbeStatus::EndpointNotFound, false),
            (500, ProbeStatus::Unclassified, true),
        ];
        for (status, expected, reachable) in cases {
            let transport =
                ScriptedTransport::new(vec![Ok(TransportResponse::new(status, "body"))]);
            let outcome = client(transport.clone(), AcceptedStatuses::OkOnly)
                .probe()
                .await;
            assert_eq!(outcome.status, expected);
            assert_eq!(outcome.is_reachable(), reachable);
            assert!(outcome.message.contains("body"));
            assert_eq!(transport.requests.lock().unwrap()[0], json!({"events": []}));
        }
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        let transport = ScriptedTransport::new(vec![Err(DeliveryError::ConnectionFailed(
            "dns error".to_string(),
        ))]);
        let outcome = client(transport, AcceptedStatuses::OkOnly).probe().await;
        assert_eq!(outcome.status, ProbeStatus::Unreachable);
        assert!(!outcome.is_reachable());
        assert_eq!(outcome.message, "Connection failed: dns error");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        let body = "ñ".repeat(300);
        assert_eq!(excerpt(&body).chars().count(), 200);
    }
}
