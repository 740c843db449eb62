//! Tracking row → [`CanonicalEvent`] mapping

use super::timestamp::{normalize_timestamp, TimestampZone};
use crate::adapters::company::CompanyLookup;
use crate::core::status::StatusNormalizer;
use crate::domain::{CanonicalEvent, RawRecord, ValidationFailure};
use std::sync::Arc;

/// Source column names of a tracking row
pub mod fields {
    pub const MARKETPLACE_ORDER_ID: &str = "marketplace_order_id";
    pub const MARKETPLACE: &str = "marketplace";
    pub const COMPANY_ID: &str = "company_id";
    pub const EVENT_STATUS: &str = "event_status";
    pub const EVENT_TIMESTAMP: &str = "event_timestamp";
    pub const EVENT_LOCATION: &str = "event_location";
    pub const COURIER_NAME: &str = "courier_name";
    pub const TRACKING_NUMBER: &str = "tracking_number";
    pub const NOTES: &str = "notes";

    /// Fields that must be present and non-blank
    pub const REQUIRED: [&str; 5] = [
        MARKETPLACE_ORDER_ID,
        MARKETPLACE,
        COMPANY_ID,
        EVENT_STATUS,
        EVENT_TIMESTAMP,
    ];
}

/// Validates tracking rows and converts them into delivery payloads
///
/// Mapping is pure apart from debug logging: the same row always yields the
/// same event.
#[derive(Clone)]
pub struct EventMapper {
    normalizer: Arc<StatusNormalizer>,
    companies: Arc<dyn CompanyLookup>,
    zone: TimestampZone,
}

impl EventMapper {
    /// Creates a mapper rendering timestamps in UTC
    pub fn new(normalizer: Arc<StatusNormalizer>, companies: Arc<dyn CompanyLookup>) -> Self {
        Self {
            normalizer,
            companies,
            zone: TimestampZone::Utc,
        }
    }

    /// Maps one tracking row
    ///
    /// # Errors
    ///
    /// Fails when a required field is blank, the timestamp is unparseable or
    /// the company reference is unknown. The failure names the field and the
    /// row's `marketplace_order_id` (or `unknown`).
    pub fn map_row(&self, row: &RawRecord) -> Result<CanonicalEvent, ValidationFailure> {
        let row_id = row.id_or_unknown(fields::MARKETPLACE_ORDER_ID);

        if let Some(missing) = fields::REQUIRED.iter().find(|f| row.get(f).is_blank()) {
            return Err(ValidationFailure::missing_field(row_id, *missing));
        }

        let order_id = required_text(row, fields::MARKETPLACE_ORDER_ID, &row_id)?;
        let marketplace = required_text(row, fields::MARKETPLACE, &row_id)?;
        let raw_status = required_text(row, fields::EVENT_STATUS, &row_id)?;
        let company_name = required_text(row, fields::COMPANY_ID, &row_id)?;

        let event_status = self.normalizer.normalize(&raw_status, &marketplace);

        let event_timestamp = normalize_timestamp(row.get(fields::EVENT_TIMESTAMP), self.zone)
            .map_err(|reason| {
                ValidationFailure::invalid_field(
                    &row_id,
                    fields::EVENT_TIMESTAMP,
                    format!("Invalid event_timestamp: {reason}"),
                )
            })?;

        let company_id = self
            .companies
            .resolve(&company_name)
            .map_err(|e| ValidationFailure::lookup(&row_id, e))?;
        tracing::debug!(company = %company_name, company_id = %company_id, "Resolved company");

        Ok(CanonicalEvent {
            marketplace_order_id: order_id,
            marketplace: marketplace.to_lowercase(),
            company_id,
            event_status,
            event_timestamp,
            event_location: row.text(fields::EVENT_LOCATION),
            courier_name: row.text(fields::COURIER_NAME),
            tracking_number: row.text(fields::TRACKING_NUMBER),
            notes: row.text(fields::NOTES),
        })
    }
}

/// Trimmed text of a required field
pub(crate) fn required_text(
    row: &RawRecord,
    field: &str,
    row_id: &str,
) -> Result<String, ValidationFailure> {
    row.text(field)
        .ok_or_else(|| ValidationFailure::missing_field(row_id, field))
}
