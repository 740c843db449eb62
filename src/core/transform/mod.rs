//! Record validation and transformation
//!
//! Converts raw source rows into delivery payloads:
//!
//! - [`event`] - one tracking row → one [`CanonicalEvent`](crate::domain::CanonicalEvent)
//! - [`order`] - the rows of one order → one [`CanonicalOrder`](crate::domain::CanonicalOrder)
//! - [`timestamp`] - loosely-typed timestamps → RFC3339 in UTC or the order zone
//! - [`batch`] - whole result sets, with per-row failure accounting

pub mod batch;
pub mod event;
pub mod order;
pub mod timestamp;

pub use batch::{group_by_order, transform_all, transform_orders, TransformOutcome};
pub use event::EventMapper;
pub use order::{MappedOrder, OrderMapper};
pub use timestamp::{normalize_timestamp, TimestampZone};
