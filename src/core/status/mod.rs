//! Status normalization
//!
//! Maps a (raw status, source system) pair onto the canonical taxonomy. The
//! lookup is an ordered list of resolver strategies, each a pure function over
//! an immutable [`StatusMapping`]:
//!
//! 1. exact match in the source-specific table
//! 2. case-insensitive membership in a canonical status's alias list
//!
//! When no resolver matches, the default status (`pending`) is returned.
//! Normalization never fails.
//!
//! # Example
//!
//! ```
//! use marketsync::core::status::{StatusMapping, StatusNormalizer};
//! use marketsync::domain::CanonicalStatus;
//!
//! # fn example() -> marketsync::domain::Result<()> {
//! let normalizer = StatusNormalizer::new(StatusMapping::builtin()?);
//! assert_eq!(normalizer.normalize("Shipped", "MELI"), CanonicalStatus::Dispatched);
//! assert_eq!(normalizer.normalize("???", "meli"), CanonicalStatus::Pending);
//! # Ok(())
//! # }
//! ```

pub mod tables;

use crate::domain::{CanonicalStatus, Result, SyncError};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// A resolver strategy: `(mapping, cleaned status, cleaned source) -> match`
pub type Resolver = fn(&StatusMapping, &str, &str) -> Option<CanonicalStatus>;

/// Default resolver chain, tried in order
pub const DEFAULT_RESOLVERS: &[(&str, Resolver)] = &[
    ("source_table", resolve_by_source_table),
    ("general_alias", resolve_by_alias),
];

/// Validated, immutable status lookup tables
#[derive(Debug, Clone)]
pub struct StatusMapping {
    aliases: Vec<(CanonicalStatus, Vec<String>)>,
    sources: HashMap<String, BTreeMap<String, CanonicalStatus>>,
}

impl StatusMapping {
    /// Builds the mapping from the built-in tables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a table references a status outside
    /// the canonical set.
    pub fn builtin() -> Result<Self> {
        Self::from_tables(tables::GENERAL_ALIASES, tables::SOURCE_TABLES)
    }

    /// Builds a mapping from raw string tables, validating every canonical name
    pub fn from_tables(general: &[(&str, &[&str])], sources: &[(&str, &[(&str, &str)])]) -> Result<Self> {
        let mut aliases: Vec<(CanonicalStatus, Vec<String>)> = Vec::with_capacity(general.len());
        for (canonical, raw_aliases) in general {
            let status = CanonicalStatus::from_str(canonical).map_err(|e| {
                SyncError::Configuration(format!("Invalid general status mapping: {e}"))
            })?;
            let cleaned: Vec<String> = raw_aliases.iter().map(|a| clean(a)).collect();
            match aliases.iter_mut().find(|(s, _)| *s == status) {
                Some((_, existing)) => existing.extend(cleaned),
                None => aliases.push((status, cleaned)),
            }
        }
        aliases.sort_by_key(|(status, _)| *status);

        let mut mapping = Self {
            aliases,
            sources: HashMap::new(),
        };
        for (source, entries) in sources {
            for (raw, canonical) in *entries {
                mapping.insert_source_entry(source, raw, canonical)?;
            }
        }
        Ok(mapping)
    }

    /// Adds or replaces source-specific entries, e.g. from configuration
    ///
    /// # Errors
    ///
    /// Fails fast on an empty key or an unknown canonical status.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, BTreeMap<String, String>>) -> Result<Self> {
        for (source, entries) in overrides {
            for (raw, canonical) in entries {
                self.insert_source_entry(source, raw, canonical)?;
            }
        }
        Ok(self)
    }

    fn insert_source_entry(&mut self, source: &str, raw: &str, canonical: &str) -> Result<()> {
        let source = clean(source);
        let raw = clean(raw);
        if source.is_empty() || raw.is_empty() {
            return Err(SyncError::Configuration(
                "Status mapping keys cannot be empty".to_string(),
            ));
        }
        let status = CanonicalStatus::from_str(canonical).map_err(|_| {
            SyncError::Configuration(format!(
                "Invalid canonical status '{canonical}' in {source} mapping for '{raw}'"
            ))
        })?;
        self.sources.entry(source).or_default().insert(raw, status);
        Ok(())
    }

    /// Source-specific entry for an already-cleaned status and source
    pub fn source_entry(&self, source: &str, status: &str) -> Option<CanonicalStatus> {
        self.sources.get(source).and_then(|t| t.get(status)).copied()
    }

    /// First canonical status whose alias list contains the cleaned status
    pub fn alias_entry(&self, status: &str) -> Option<CanonicalStatus> {
        self.aliases
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a == status))
            .map(|(canonical, _)| *canonical)
    }

    /// Raw statuses known for a source, sorted
    pub fn source_statuses(&self, source: &str) -> Vec<String> {
        self.sources
            .get(&clean(source))
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Sources with a specific table, sorted
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.sources.keys().cloned().collect();
        sources.sort();
        sources
    }
}

/// Tier 1: exact match in the source-specific table
pub fn resolve_by_source_table(
    mapping: &StatusMapping,
    status: &str,
    source: &str,
) -> Option<CanonicalStatus> {
    mapping.source_entry(source, status)
}

/// Tier 2: general alias table, first canonical status wins
pub fn resolve_by_alias(
    mapping: &StatusMapping,
    status: &str,
    _source: &str,
) -> Option<CanonicalStatus> {
    mapping.alias_entry(status)
}

/// Normalizes raw statuses through an ordered resolver chain
#[derive(Debug, Clone)]
pub struct StatusNormalizer {
    mapping: StatusMapping,
    resolvers: Vec<(&'static str, Resolver)>,
    default_status: CanonicalStatus,
}

impl StatusNormalizer {
    /// Creates a normalizer with the default resolver chain
    pub fn new(mapping: StatusMapping) -> Self {
        Self::with_resolvers(mapping, DEFAULT_RESOLVERS.to_vec())
    }

    /// Creates a normalizer with a custom resolver chain
    pub fn with_resolvers(mapping: StatusMapping, resolvers: Vec<(&'static str, Resolver)>) -> Self {
        Self {
            mapping,
            resolvers,
            default_status: CanonicalStatus::default(),
        }
    }

    /// Maps a raw marketplace status onto the canonical taxonomy
    ///
    /// Inputs are trimmed and lower-cased. Blank inputs and unmapped pairs
    /// yield the default status and are logged.
    pub fn normalize(&self, raw_status: &str, source_system: &str) -> CanonicalStatus {
        let status = clean(raw_status);
        let source = clean(source_system);

        if status.is_empty() || source.is_empty() {
            tracing::warn!(
                raw_status = raw_status,
                marketplace = source_system,
                fallback = %self.default_status,
                "Missing status or marketplace"
            );
            return self.default_status;
        }

        for (name, resolver) in &self.resolvers {
            if let Some(canonical) = resolver(&self.mapping, &status, &source) {
                tracing::debug!(
                    resolver = name,
                    marketplace = %source,
                    raw_status = raw_status,
                    canonical = %canonical,
                    "Mapped status"
                );
                return canonical;
            }
        }

        tracing::warn!(
            marketplace = %source,
            raw_status = raw_status,
            fallback = %self.default_status,
            "Unmapped status"
        );
        self.default_status
    }

    /// All canonical statuses
    pub fn supported_statuses(&self) -> Vec<CanonicalStatus> {
        CanonicalStatus::ALL.to_vec()
    }

    /// Raw statuses with a source-specific entry
    pub fn source_statuses(&self, source_system: &str) -> Vec<String> {
        self.mapping.source_statuses(source_system)
    }

    /// The underlying mapping
    pub fn mapping(&self) -> &StatusMapping {
        &self.mapping
    }
}

fn clean(value: &str) -> String {
    value.trim().to_lowercase()
}
