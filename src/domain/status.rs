//! Canonical status taxonomy
//!
//! Every marketplace status is normalized into one of these values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical shipment/order status
///
/// Declaration order matters: alias resolution scans statuses in this order,
/// so an alias listed under two statuses resolves to the earlier one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    #[default]
    Pending,
    ReadyToShip,
    Dispatched,
    InTransit,
    OutForDelivery,
    Delivered,
    DeliveryFailed,
    Cancelled,
    Returned,
}

impl CanonicalStatus {
    /// All canonical statuses in declaration order
    pub const ALL: [CanonicalStatus; 9] = [
        CanonicalStatus::Pending,
        CanonicalStatus::ReadyToShip,
        CanonicalStatus::Dispatched,
        CanonicalStatus::InTransit,
        CanonicalStatus::OutForDelivery,
        CanonicalStatus::Delivered,
        CanonicalStatus::DeliveryFailed,
        CanonicalStatus::Cancelled,
        CanonicalStatus::Returned,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::Pending => "pending",
            CanonicalStatus::ReadyToShip => "ready_to_ship",
            CanonicalStatus::Dispatched => "dispatched",
            CanonicalStatus::InTransit => "in_transit",
            CanonicalStatus::OutForDelivery => "out_for_delivery",
            CanonicalStatus::Delivered => "delivered",
            CanonicalStatus::DeliveryFailed => "delivery_failed",
            CanonicalStatus::Cancelled => "cancelled",
            CanonicalStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().to_lowercase();
        CanonicalStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == cleaned)
            .ok_or_else(|| {
                format!(
                    "Invalid canonical status '{}'. Must be one of: {}",
                    s,
                    CanonicalStatus::ALL
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for status in CanonicalStatus::ALL {
            assert_eq!(status.as_str().parse::<CanonicalStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&CanonicalStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "teleported".parse::<CanonicalStatus>().unwrap_err();
        assert!(err.contains("teleported"));
        assert!(err.contains("ready_to_ship"));
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(CanonicalStatus::default(), CanonicalStatus::Pending);
    }
}
