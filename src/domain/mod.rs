//! Domain models and types for marketsync.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Company identifier** ([`CompanyId`])
//! - **Raw rows** ([`RawRecord`], [`FieldValue`]) as handed over by the data source
//! - **Delivery payloads** ([`CanonicalEvent`], [`CanonicalOrder`])
//! - **The canonical status taxonomy** ([`CanonicalStatus`])
//! - **Error types** ([`SyncError`], [`DeliveryError`], [`LookupError`], [`ValidationFailure`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust,no_run
//! use marketsync::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = marketsync::config::load_config("marketsync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod event;
pub mod ids;
pub mod order;
pub mod record;
pub mod result;
pub mod status;

// Re-export commonly used types for convenience
pub use errors::{DeliveryError, LookupError, SyncError, ValidationFailure};
pub use event::CanonicalEvent;
pub use ids::CompanyId;
pub use order::{CanonicalOrder, LineItem};
pub use record::{FieldValue, RawRecord};
pub use result::Result;
pub use status::CanonicalStatus;
