//! Canonical tracking event payload

use super::ids::CompanyId;
use super::status::CanonicalStatus;
use serde::{Deserialize, Serialize};

/// A shipment tracking event in the delivery contract shape
///
/// Required fields are plain values, so an event cannot exist with a missing
/// required field. Optional fields are omitted from the JSON when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Marketplace order/shipment identifier
    pub marketplace_order_id: String,

    /// Lower-cased marketplace code
    pub marketplace: String,

    /// Resolved company UUID
    pub company_id: CompanyId,

    /// Normalized status
    pub event_status: CanonicalStatus,

    /// RFC3339 timestamp with explicit offset, second precision
    pub event_timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
