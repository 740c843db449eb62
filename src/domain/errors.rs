//! Domain error types
//!
//! This module defines the error hierarchy for marketsync.
//! All errors are domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// Main marketsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised by the upstream row source
    #[error("Source error: {0}")]
    Source(String),

    /// Delivery endpoint errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Identifier lookup errors
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Delivery endpoint errors
///
/// Errors that occur when talking to the downstream HTTP endpoint.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Connection could not be established
    #[error("Connection error: {0}")]
    ConnectionFailed(String),

    /// Request exceeded its timeout
    #[error("Timeout after {0}s")]
    Timeout(u64),

    /// Endpoint rejected the credentials (401)
    #[error("Authentication failed (401): {0}")]
    AuthenticationFailed(String),

    /// Endpoint does not exist (404)
    #[error("Endpoint not found (404): {0}")]
    EndpointNotFound(String),

    /// Any other non-success response
    #[error("Failed: {status} - {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Request could not be built or sent for a non-network reason
    #[error("Request exception: {0}")]
    Request(String),
}

impl DeliveryError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::ConnectionFailed(_) | DeliveryError::Timeout(_) => true,
            DeliveryError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Company lookup errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Name absent from the company table
    #[error("Company '{name}' not found in mapping. Available companies: {known:?}")]
    CompanyNotFound { name: String, known: Vec<String> },
}

/// Why a single row (or order group) could not become a payload
///
/// Row-level failures are recovered locally: the row is skipped and the run
/// continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Identifier of the offending row, or `unknown`
    pub row_id: String,

    /// Field that failed, when a single field is to blame
    pub field: Option<String>,

    /// Human-readable reason
    pub reason: String,
}

impl ValidationFailure {
    /// A required field is missing or blank
    pub fn missing_field(row_id: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            row_id: row_id.into(),
            reason: format!("Missing required field '{field}'"),
            field: Some(field),
        }
    }

    /// A field is present but its value cannot be used
    pub fn invalid_field(
        row_id: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Company reference could not be resolved
    pub fn lookup(row_id: impl Into<String>, err: LookupError) -> Self {
        let row_id = row_id.into();
        Self {
            reason: format!("Company mapping error for order {row_id}: {err}"),
            row_id,
            field: Some("company_id".to_string()),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "row {} [{}]: {}", self.row_id, field, self.reason),
            None => write!(f, "row {}: {}", self.row_id, self.reason),
        }
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for SyncError {
    fn from(err: ValidationFailure) -> Self {
        SyncError::Validation(err.to_string())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
