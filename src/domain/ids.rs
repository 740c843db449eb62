//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a sync run. Each type
//! normalizes its input once so downstream code can compare by value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical company identifier
///
/// The downstream endpoint identifies companies by UUID. Values are rendered in
/// lower-case hyphenated form.
///
/// # Examples
///
/// ```
/// use marketsync::domain::ids::CompanyId;
/// use std::str::FromStr;
///
/// let id = CompanyId::from_str("C12585EE-C8F4-4103-B7F0-37BD62401A65").unwrap();
/// assert_eq!(id.to_string(), "c12585ee-c8f4-4103-b7f0-37bd62401a65");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Creates a new CompanyId from a UUID string
    ///
    /// # Returns
    ///
    /// Returns `Ok(CompanyId)` if the value is UUID-shaped, `Err` otherwise
    pub fn new(id: impl AsRef<str>) -> Result<Self, String> {
        let id = id.as_ref().trim();
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|e| format!("Company ID '{id}' is not a valid UUID: {e}"))
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CompanyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CompanyId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompanyId> for String {
    fn from(id: CompanyId) -> Self {
        id.to_string()
    }
}
