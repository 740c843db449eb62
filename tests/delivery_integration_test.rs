//! Integration tests for delivery against a mock HTTP endpoint

use marketsync::adapters::http::ReqwestTransport;
use marketsync::config::{secret_string, OrdersConfig, TrackingConfig};
use marketsync::core::delivery::{
    AcceptedStatuses, BatchDispatcher, ClientSettings, DeliveryClient, ProbeStatus, RetryPolicy,
};
use marketsync::core::sync::{order_dispatcher, tracking_dispatcher};
use marketsync::domain::CanonicalOrder;
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const PATH: &str = "/functions/v1/process-shipment-tracking";

fn tracking_config(base_url: String, max_retries: u32) -> TrackingConfig {
    let mut config = TrackingConfig::new(base_url, secret_string("service-key".to_string()));
    config.max_retries = max_retries;
    config.backoff_unit_ms = 1;
    config.batch_size = 2;
    config
}

fn client(url: String, max_retries: u32, accepted: AcceptedStatuses) -> DeliveryClient {
    let transport = ReqwestTransport::new(secret_string("service-key".to_string())).unwrap();
    DeliveryClient::new(
        Arc::new(transport),
        ClientSettings {
            url,
            timeout: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(5),
            retry: RetryPolicy::new(max_retries, Duration::from_millis(1)),
            accepted,
        },
    )
}

#[tokio::test]
async fn test_batch_body_and_auth_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer service-key")
        .match_body(Matcher::Json(json!({"events": [{"id": 1}, {"id": 2}]})))
        .with_status(200)
        .with_body(r#"{"created": 1, "updated": 1, "skipped": 0, "errors": 0}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), 3, AcceptedStatuses::OkOnly);
    let response = client
        .send_batch(&[json!({"id": 1}), json!({"id": 2})])
        .await;

    mock.assert_async().await;
    assert!(response.success);
    assert_eq!(response.message, "Success: 200");
    let summary = response.summary.unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
}

#[tokio::test]
async fn test_server_error_is_retried_until_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("upstream down")
        .expect(3)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), 2, AcceptedStatuses::OkOnly);
    let response = client.send_batch(&[json!({"id": 1})]).await;

    mock.assert_async().await;
    assert!(!response.success);
    assert_eq!(response.message, "Failed: 503 - upstream down");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(401)
        .with_body("invalid JWT")
        .expect(1)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), 3, AcceptedStatuses::OkOnly);
    let response = client.send_batch(&[json!({"id": 1})]).await;

    mock.assert_async().await;
    assert!(!response.success);
}

#[tokio::test]
async fn test_created_only_accepted_for_orders() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/orders")
        .with_status(201)
        .create_async()
        .await;
    let url = format!("{}/orders", server.url());

    let tracking = client(url.clone(), 0, AcceptedStatuses::OkOnly);
    assert!(!tracking.send_batch(&[json!({"id": 1})]).await.success);

    let orders = client(url, 0, AcceptedStatuses::OkOrCreated);
    let response = orders.send_batch(&[json!({"id": 1})]).await;
    assert!(response.success);
    assert_eq!(response.message, "Success: 201");
}

#[tokio::test]
async fn test_probe_classifications() {
    let cases = [
        (400, ProbeStatus::ValidationRejected, true),
        (500, ProbeStatus::Unclassified, true),
        (401, ProbeStatus::AuthenticationFailed, false),
        (404, ProbeStatus::EndpointNotFound, false),
    ];

    for (status, expected, reachable) in cases {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::Json(json!({"events": []})))
            .with_status(status)
            .with_body("probe")
            .expect(1)
            .create_async()
            .await;

        let dispatcher = tracking_dispatcher(&tracking_config(server.url(), 3)).unwrap();
        let outcome = dispatcher.client().probe().await;

        mock.assert_async().await;
        assert_eq!(outcome.status, expected, "status {status}");
        assert_eq!(outcome.is_reachable(), reachable, "status {status}");
        assert_eq!(outcome.http_status, Some(status as u16));
    }
}

#[tokio::test]
async fn test_probe_unreachable_host() {
    let dispatcher =
        tracking_dispatcher(&tracking_config("http://127.0.0.1:9".to_string(), 0)).unwrap();
    let outcome = dispatcher.client().probe().await;

    assert_eq!(outcome.status, ProbeStatus::Unreachable);
    assert!(!outcome.is_reachable());
    assert!(outcome.http_status.is_none());
}

#[tokio::test]
async fn test_dispatcher_batches_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .expect(3)
        .create_async()
        .await;

    let dispatcher: BatchDispatcher = tracking_dispatcher(&tracking_config(server.url(), 0)).unwrap();
    let payloads: Vec<_> = (0..5).map(|i| json!({ "id": i })).collect();
    let result = dispatcher.dispatch(&payloads).await;

    mock.assert_async().await;
    assert_eq!(result.total, 5);
    assert_eq!(result.successful, 5);
    assert!(result.is_complete_success());
}

#[tokio::test]
async fn test_order_dispatcher_reports_failed_orders() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/orders")
        .with_status(422)
        .with_body("missing sku")
        .create_async()
        .await;

    let mut config = OrdersConfig::new(
        format!("{}/orders", server.url()),
        secret_string("order-token".to_string()),
    );
    config.max_retries = 0;
    let dispatcher = order_dispatcher(&config).unwrap();

    let order: CanonicalOrder = serde_json::from_value(json!({
        "order": "2000001",
        "status": "paid",
        "canonical_status": "pending",
        "market_place": "meli",
        "order_created_at": "2024-01-15T07:00:00-03:00",
        "sku": {"SKU-1": {"quantity": 1}}
    }))
    .unwrap();
    let result = dispatcher.dispatch_orders(&[order]).await;

    assert_eq!(result.failed, 1);
    assert_eq!(result.errors, vec!["Order 2000001 (meli): Failed: 422 - missing sku"]);
}
