//! Order rows → [`CanonicalOrder`] mapping
//!
//! The data source returns one row per order line. Rows sharing an order id
//! are mapped together; the first row carries the order-level fields.

use super::event::required_text;
use super::timestamp::{normalize_timestamp, TimestampZone};
use crate::adapters::company::CompanyLookup;
use crate::core::status::StatusNormalizer;
use crate::domain::{CanonicalOrder, LineItem, RawRecord, ValidationFailure};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Source column names of an order row
pub mod fields {
    pub const ORDER_ID: &str = "order_id";
    pub const MARKETPLACE: &str = "marketplace";
    pub const STATUS: &str = "status";
    pub const ORDER_CREATED_AT: &str = "order_created_at";
    pub const SHIPPING_ID: &str = "shipping_id";
    pub const SHIPPING_STATUS: &str = "shipping_status";
    pub const LOGISTIC_TYPE: &str = "logistic_type";
    pub const SHIPPING_PROMISE_DATE: &str = "shipping_promise_date";
    pub const COMPANY_ID: &str = "company_id";
    pub const SELLER_SKU: &str = "seller_sku";
    pub const QUANTITY: &str = "quantity";
    pub const SKU_NAME: &str = "sku_name";
    pub const MARKET_PLACE_MATCH_ID: &str = "market_place_match_id";
    pub const ORDER_ITEM_ID: &str = "order_item_id";

    /// Order-level fields that must be present on the first row
    pub const REQUIRED: [&str; 4] = [ORDER_ID, MARKETPLACE, STATUS, ORDER_CREATED_AT];

    /// Order-level fields expected to agree across all rows of an order
    pub const ORDER_LEVEL: [&str; 8] = [
        MARKETPLACE,
        STATUS,
        ORDER_CREATED_AT,
        SHIPPING_ID,
        SHIPPING_STATUS,
        LOGISTIC_TYPE,
        SHIPPING_PROMISE_DATE,
        COMPANY_ID,
    ];
}

/// An order payload together with its consistency report
#[derive(Debug, Clone, PartialEq)]
pub struct MappedOrder {
    pub order: CanonicalOrder,

    /// Order-level fields on later rows that disagreed with the first row
    pub conflicts: Vec<String>,
}

/// Validates grouped order rows and converts them into webhook payloads
#[derive(Clone)]
pub struct OrderMapper {
    normalizer: Arc<StatusNormalizer>,
    companies: Arc<dyn CompanyLookup>,
    zone: TimestampZone,
}

impl OrderMapper {
    /// Creates a mapper rendering timestamps in the order zone
    pub fn new(normalizer: Arc<StatusNormalizer>, companies: Arc<dyn CompanyLookup>) -> Self {
        Self {
            normalizer,
            companies,
            zone: TimestampZone::ORDERS,
        }
    }

    /// Overrides the zone timestamps are rendered in
    pub fn with_zone(mut self, zone: TimestampZone) -> Self {
        self.zone = zone;
        self
    }

    /// Maps the rows of one order
    ///
    /// # Errors
    ///
    /// Fails when a required order-level field is blank, `order_created_at`
    /// is unparseable, a line lacks a SKU or integer quantity, or the company
    /// reference is unknown.
    pub fn map_order(
        &self,
        order_id: &str,
        rows: &[&RawRecord],
    ) -> Result<CanonicalOrder, ValidationFailure> {
        self.map_order_checked(order_id, rows).map(|mapped| mapped.order)
    }

    /// Like [`map_order`](Self::map_order), also reporting row disagreements
    pub fn map_order_checked(
        &self,
        order_id: &str,
        rows: &[&RawRecord],
    ) -> Result<MappedOrder, ValidationFailure> {
        let first = rows.first().ok_or_else(|| ValidationFailure {
            row_id: order_id.to_string(),
            field: None,
            reason: "Order has no rows".to_string(),
        })?;

        if let Some(missing) = fields::REQUIRED.iter().find(|f| first.get(f).is_blank()) {
            return Err(ValidationFailure::missing_field(order_id, *missing));
        }

        let market_place = required_text(first, fields::MARKETPLACE, order_id)?;
        let status = required_text(first, fields::STATUS, order_id)?;
        let canonical_status = self.normalizer.normalize(&status, &market_place);

        let order_created_at = normalize_timestamp(first.get(fields::ORDER_CREATED_AT), self.zone)
            .map_err(|reason| {
                ValidationFailure::invalid_field(
                    order_id,
                    fields::ORDER_CREATED_AT,
                    format!("Invalid order_created_at: {reason}"),
                )
            })?;

        let shipping_promise_date = self.optional_timestamp(order_id, first);

        let company_id = match first.text(fields::COMPANY_ID) {
            Some(name) => Some(
                self.companies
                    .resolve(&name)
                    .map_err(|e| ValidationFailure::lookup(order_id, e))?,
            ),
            None => None,
        };

        let sku = build_line_items(order_id, rows)?;
        let conflicts = find_conflicts(rows);
        if !conflicts.is_empty() {
            tracing::warn!(
                order_id = order_id,
                fields = ?conflicts,
                "Order rows disagree on order-level fields; first row kept"
            );
        }

        Ok(MappedOrder {
            order: CanonicalOrder {
                order: order_id.to_string(),
                shipping_id: first.text(fields::SHIPPING_ID),
                status,
                canonical_status,
                shipping_status: first.text(fields::SHIPPING_STATUS),
                logistic_type: first.text(fields::LOGISTIC_TYPE),
                market_place,
                company_id,
                order_created_at,
                shipping_promise_date,
                sku,
            },
            conflicts,
        })
    }

    fn optional_timestamp(&self, order_id: &str, row: &RawRecord) -> Option<String> {
        let value = row.get(fields::SHIPPING_PROMISE_DATE);
        if value.is_blank() {
            return None;
        }
        match normalize_timestamp(value, self.zone) {
            Ok(rendered) => Some(rendered),
            Err(reason) => {
                tracing::warn!(
                    order_id = order_id,
                    reason = %reason,
                    "Dropping unparseable shipping_promise_date"
                );
                None
            }
        }
    }
}

/// Builds the SKU map; repeated SKUs get `<sku>#<n>` keys
fn build_line_items(
    order_id: &str,
    rows: &[&RawRecord],
) -> Result<BTreeMap<String, LineItem>, ValidationFailure> {
    let mut items = BTreeMap::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let seller_sku = required_text(row, fields::SELLER_SKU, order_id)?;

        let quantity_value = row.get(fields::QUANTITY);
        if quantity_value.is_blank() {
            return Err(ValidationFailure::missing_field(order_id, fields::QUANTITY));
        }
        let quantity = quantity_value
            .as_i64()
            .filter(|q| *q >= 0)
            .ok_or_else(|| {
                ValidationFailure::invalid_field(
                    order_id,
                    fields::QUANTITY,
                    format!("Invalid quantity for SKU {seller_sku}: {quantity_value:?}"),
                )
            })?;

        let occurrence = seen.entry(seller_sku.clone()).or_insert(0);
        *occurrence += 1;
        let key = if *occurrence == 1 {
            seller_sku
        } else {
            format!("{seller_sku}#{occurrence}")
        };

        items.insert(
            key,
            LineItem {
                quantity,
                name: row.text(fields::SKU_NAME),
                market_place_match_id: row.text(fields::MARKET_PLACE_MATCH_ID),
                order_item_id: row.text(fields::ORDER_ITEM_ID),
            },
        );
    }

    Ok(items)
}

/// Order-level fields whose value on a later row differs from the first row
pub fn find_conflicts(rows: &[&RawRecord]) -> Vec<String> {
    let Some((first, rest)) = rows.split_first() else {
        return Vec::new();
    };
    fields::ORDER_LEVEL
        .iter()
        .filter(|field| {
            let expected = first.text(field);
            rest.iter().any(|row| row.text(field) != expected)
        })
        .map(|field| field.to_string())
        .collect()
}
