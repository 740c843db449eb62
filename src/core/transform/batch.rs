//! Batch transformation of raw rows into payloads
//!
//! Row-level validation failures never abort a run: the row (or order group)
//! is counted as skipped and processing continues.

use super::event::EventMapper;
use super::order::{fields as order_fields, OrderMapper};
use crate::domain::{CanonicalEvent, CanonicalOrder, RawRecord, ValidationFailure};
use std::collections::HashMap;

/// Outcome of one transformation pass
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome<T> {
    /// Valid payloads in source order
    pub payloads: Vec<T>,

    /// Rows (tracking) or order groups (orders) that failed validation
    pub skipped: usize,

    /// Why each skipped row failed
    pub failures: Vec<ValidationFailure>,

    /// Order groups whose rows disagreed on order-level fields
    pub conflicts: usize,
}

impl<T> Default for TransformOutcome<T> {
    fn default() -> Self {
        Self {
            payloads: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
            conflicts: 0,
        }
    }
}

impl<T> TransformOutcome<T> {
    fn record_failure(&mut self, failure: ValidationFailure) {
        self.skipped += 1;
        self.failures.push(failure);
    }

    /// Whether no payload was produced
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// Maps every tracking row, in source order
///
/// `rows.len() == payloads.len() + skipped` always holds.
pub fn transform_all(rows: &[RawRecord], mapper: &EventMapper) -> TransformOutcome<CanonicalEvent> {
    let mut outcome = TransformOutcome::default();
    if rows.is_empty() {
        tracing::info!("No tracking events to transform");
        return outcome;
    }

    for row in rows {
        match mapper.map_row(row) {
            Ok(event) => outcome.payloads.push(event),
            Err(failure) => {
                tracing::warn!(
                    row_id = %failure.row_id,
                    field = ?failure.field,
                    reason = %failure.reason,
                    "Skipping tracking row"
                );
                outcome.record_failure(failure);
            }
        }
    }

    tracing::info!(
        total_rows = rows.len(),
        valid_events = outcome.payloads.len(),
        skipped_events = outcome.skipped,
        "Tracking events transformation completed"
    );
    outcome
}

/// Groups order rows by order id and maps each group
///
/// Groups keep first-occurrence order. A row with a blank order id counts as
/// one skipped group of its own.
pub fn transform_orders(
    rows: &[RawRecord],
    mapper: &OrderMapper,
) -> TransformOutcome<CanonicalOrder> {
    let mut outcome = TransformOutcome::default();
    if rows.is_empty() {
        tracing::info!("No orders to transform");
        return outcome;
    }

    let (groups, orphans) = group_by_order(rows);
    for _ in 0..orphans {
        let failure = ValidationFailure::missing_field("unknown", order_fields::ORDER_ID);
        tracing::warn!(reason = %failure.reason, "Skipping order row");
        outcome.record_failure(failure);
    }

    for (order_id, group) in &groups {
        match mapper.map_order_checked(order_id, group) {
            Ok(mapped) => {
                if !mapped.conflicts.is_empty() {
                    outcome.conflicts += 1;
                }
                outcome.payloads.push(mapped.order);
            }
            Err(failure) => {
                let marketplace = group
                    .first()
                    .map(|row| row.id_or_unknown(order_fields::MARKETPLACE))
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::error!(
                    order_id = %order_id,
                    marketplace = %marketplace,
                    reason = %failure.reason,
                    "Order transformation failed"
                );
                outcome.record_failure(failure);
            }
        }
    }

    tracing::info!(
        total_rows = rows.len(),
        orders = groups.len(),
        valid_orders = outcome.payloads.len(),
        skipped = outcome.skipped,
        conflicting_orders = outcome.conflicts,
        "Order transformation completed"
    );
    outcome
}

/// Groups rows by trimmed order id in first-occurrence order
///
/// Returns the groups and the number of rows without an order id.
pub fn group_by_order(rows: &[RawRecord]) -> (Vec<(String, Vec<&RawRecord>)>, usize) {
    let mut groups: Vec<(String, Vec<&RawRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut orphans = 0;

    for row in rows {
        let Some(order_id) = row.text(order_fields::ORDER_ID) else {
            orphans += 1;
            continue;
        };
        match index.get(&order_id) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(order_id.clone(), groups.len());
                groups.push((order_id, vec![row]));
            }
        }
    }

    (groups, orphans)
}
