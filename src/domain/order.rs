//! Canonical order payload for the per-order webhook

use super::ids::CompanyId;
use super::status::CanonicalStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One SKU line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_place_match_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_item_id: Option<String>,
}

/// An order with its line items in the webhook contract shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    /// Marketplace order identifier
    pub order: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_id: Option<String>,

    /// Status exactly as reported by the marketplace (trimmed)
    pub status: String,

    /// Normalized status
    pub canonical_status: CanonicalStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistic_type: Option<String>,

    /// Marketplace code as reported
    pub market_place: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,

    /// RFC3339 timestamp in the order timezone, second precision
    pub order_created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_promise_date: Option<String>,

    /// Line items keyed by seller SKU
    pub sku: BTreeMap<String, LineItem>,
}

impl CanonicalOrder {
    /// Total number of line items
    pub fn line_count(&self) -> usize {
        self.sku.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_serialization_omits_blank_optionals() {
        let mut sku = BTreeMap::new();
        sku.insert(
            "SKU-1".to_string(),
            LineItem {
                quantity: 2,
                name: Some("Mug".to_string()),
                market_place_match_id: None,
                order_item_id: None,
            },
        );
        let order = CanonicalOrder {
            order: "2000001".to_string(),
            shipping_id: None,
            status: "paid".to_string(),
            canonical_status: CanonicalStatus::Pending,
            shipping_status: None,
            logistic_type: None,
            market_place: "meli".to_string(),
            company_id: None,
            order_created_at: "2024-01-01T09:00:00-03:00".to_string(),
            shipping_promise_date: None,
            sku,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("shipping_promise_date").is_none());
        assert!(json.get("company_id").is_none());
        assert_eq!(json["sku"]["SKU-1"]["quantity"], 2);
        assert!(json["sku"]["SKU-1"].get("order_item_id").is_none());
        assert_eq!(order.line_count(), 1);
    }
}
