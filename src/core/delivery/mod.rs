//! Reliable delivery to the downstream endpoint
//!
//! - [`retry`] - bounded retry loop with exponential backoff
//! - [`client`] - one request per batch or order, response interpretation, probe
//! - [`dispatcher`] - batching and ordered aggregation
//! - [`result`] - the aggregated [`DeliveryResult`]

pub mod client;
pub mod dispatcher;
pub mod result;
pub mod retry;

pub use client::{
    AcceptedStatuses, BatchResponse, ClientSettings, DeliveryClient, ProbeOutcome, ProbeStatus,
    ResponseSummary,
};
pub use dispatcher::BatchDispatcher;
pub use result::{DeliveryResult, MAX_REPORTED_ERRORS};
pub use retry::RetryPolicy;
