//! HTTP transport for payload delivery
//!
//! The delivery client talks to the endpoint through [`DeliveryTransport`],
//! so its retry and status handling can be exercised without a network.

use crate::config::SecretString;
use crate::domain::{DeliveryError, Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

/// Raw response of one POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one JSON document and returns the raw response
///
/// Implementations report a timed-out request as [`DeliveryError::Timeout`]
/// and an unreachable endpoint as [`DeliveryError::ConnectionFailed`]. Any
/// HTTP status, including errors, is a successful transport call.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, DeliveryError>;
}

/// [`DeliveryTransport`] over reqwest with bearer authentication
pub struct ReqwestTransport {
    client: Client,
    token: SecretString,
}

impl ReqwestTransport {
    /// Creates a transport authenticating with `token`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: SecretString) -> Result<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("marketsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Other(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, token })
    }
}

#[async_trait]
impl DeliveryTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, DeliveryError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        Ok(TransportResponse { status, body })
    }
}

fn classify_error(err: reqwest::Error, timeout: Duration) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout(timeout.as_secs())
    } else if err.is_connect() {
        DeliveryError::ConnectionFailed(err.to_string())
    } else {
        DeliveryError::Request(err.to_string())
    }
}
