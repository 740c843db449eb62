//! Company name → identifier lookup

use crate::domain::{CompanyId, LookupError, Result, SyncError};
use std::collections::BTreeMap;

/// Built-in company entries
pub const BUILTIN_COMPANIES: &[(&str, &str)] =
    &[("bamo_company", "c12585ee-c8f4-4103-b7f0-37bd62401a65")];

/// Resolves company references found in source rows
pub trait CompanyLookup: Send + Sync {
    /// Resolves a company name to its identifier
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::CompanyNotFound`] listing the known names.
    fn resolve(&self, name: &str) -> std::result::Result<CompanyId, LookupError>;
}

/// Static, in-memory company table
///
/// Names are matched trimmed and case-insensitively.
#[derive(Debug, Clone)]
pub struct CompanyDirectory {
    entries: BTreeMap<String, CompanyId>,
}

impl CompanyDirectory {
    /// Directory holding only the built-in entries
    pub fn builtin() -> Result<Self> {
        Self::with_entries(&BTreeMap::new())
    }

    /// Built-in entries extended (or overridden) by `extra`
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a name is empty or an identifier is
    /// not a UUID.
    pub fn with_entries(extra: &BTreeMap<String, String>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let builtin = BUILTIN_COMPANIES
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()));
        for (name, id) in builtin.chain(extra.clone()) {
            let key = name.trim().to_lowercase();
            if key.is_empty() {
                return Err(SyncError::Configuration(
                    "Company name cannot be empty".to_string(),
                ));
            }
            let company_id = CompanyId::new(&id).map_err(|e| {
                SyncError::Configuration(format!("Invalid identifier for company '{name}': {e}"))
            })?;
            entries.insert(key, company_id);
        }
        Ok(Self { entries })
    }

    /// Known company names, sorted
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of known companies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompanyLookup for CompanyDirectory {
    fn resolve(&self, name: &str) -> std::result::Result<CompanyId, LookupError> {
        self.entries
            .get(&name.trim().to_lowercase())
            .copied()
            .ok_or_else(|| LookupError::CompanyNotFound {
                name: name.to_string(),
                known: self.names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_entry_resolves() {
        let directory = CompanyDirectory::builtin().unwrap();
        let id = directory.resolve("bamo_company").unwrap();
        assert_eq!(id.to_string(), "c12585ee-c8f4-4103-b7f0-37bd62401a65");
        assert_eq!(directory.resolve("  BAMO_Company ").unwrap(), id);
    }

    #[test]
    fn test_unknown_company_lists_known_names() {
        let directory = CompanyDirectory::builtin().unwrap();
        match directory.resolve("acme") {
            Err(LookupError::CompanyNotFound { name, known }) => {
                assert_eq!(name, "acme");
                assert_eq!(known, vec!["bamo_company".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_extra_entries() {
        let mut extra = BTreeMap::new();
        extra.insert(
            "acme".to_string(),
            "0b6c3c1e-4a8e-4f4e-9a55-0a8f3f1b2c3d".to_string(),
        );
        let directory = CompanyDirectory::with_entries(&extra).unwrap();
        assert_eq!(directory.len(), 2);
        assert!(directory.resolve("ACME").is_ok());
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let mut extra = BTreeMap::new();
        extra.insert("acme".to_string(), "not-a-uuid".to_string());
        let err = CompanyDirectory::with_entries(&extra).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }
}
