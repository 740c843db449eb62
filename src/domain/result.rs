//! Crate-wide result alias

use super::errors::SyncError;

/// Result of a fallible marketsync operation
///
/// ```
/// use marketsync::domain::{Result, SyncError};
///
/// fn require_source(path: Option<&str>) -> Result<&str> {
///     path.ok_or_else(|| SyncError::Configuration("source.path is not set".into()))
/// }
///
/// assert!(require_source(None).is_err());
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
