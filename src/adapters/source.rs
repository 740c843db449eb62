//! Upstream row providers

use crate::core::transform::timestamp::{parse_instant, TimestampZone};
use crate::domain::{RawRecord, Result, SyncError};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::path::PathBuf;

/// Default marketplaces queried
pub const DEFAULT_MARKETPLACES: [&str; 4] = ["meli", "fala", "walm", "cenc"];

/// Parameters of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    /// Only rows changed within this window
    pub lookback_minutes: u32,

    /// Marketplace codes to include; empty means all
    pub marketplaces: Vec<String>,
}

impl RowQuery {
    pub fn new(lookback_minutes: u32, marketplaces: Vec<String>) -> Self {
        Self {
            lookback_minutes,
            marketplaces: marketplaces
                .into_iter()
                .map(|m| m.trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether a row's marketplace passes the filter
    pub fn includes_marketplace(&self, marketplace: Option<&str>) -> bool {
        if self.marketplaces.is_empty() {
            return true;
        }
        marketplace
            .map(|m| m.trim().to_lowercase())
            .is_some_and(|m| self.marketplaces.contains(&m))
    }
}

/// Source of raw rows for one sync run
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetches the rows matching `query`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Source`] when the source cannot be read.
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRecord>>;
}

/// Reads rows from a JSON array file or a newline-delimited JSON file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    marketplace_column: String,
    lookback_column: Option<String>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            marketplace_column: "marketplace".to_string(),
            lookback_column: None,
        }
    }

    /// Applies the lookback window to the given timestamp column
    ///
    /// Rows whose column cannot be parsed are kept so validation reports them.
    pub fn with_lookback_column(mut self, column: Option<String>) -> Self {
        self.lookback_column = column;
        self
    }

    fn parse(&self, content: &str) -> Result<Vec<RawRecord>> {
        let values: Vec<Value> = if content.trim_start().starts_with('[') {
            serde_json::from_str(content).map_err(|e| {
                SyncError::Source(format!("Invalid JSON in {}: {e}", self.path.display()))
            })?
        } else {
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        SyncError::Source(format!(
                            "Invalid JSON on line {} of {}: {e}",
                            i + 1,
                            self.path.display()
                        ))
                    })
                })
                .collect::<Result<_>>()?
        };

        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                RawRecord::from_json(value).ok_or_else(|| {
                    SyncError::Source(format!(
                        "Row {} of {} is not a JSON object",
                        i + 1,
                        self.path.display()
                    ))
                })
            })
            .collect()
    }

    fn within_lookback(&self, row: &RawRecord, query: &RowQuery) -> bool {
        let Some(column) = &self.lookback_column else {
            return true;
        };
        let cutoff = Utc::now() - ChronoDuration::minutes(i64::from(query.lookback_minutes));
        match parse_instant(row.get(column), TimestampZone::Utc) {
            Ok(instant) => instant >= cutoff,
            Err(_) => true,
        }
    }
}

#[async_trait]
impl RowSource for JsonFileSource {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Source(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        let rows = self.parse(&content)?;
        let read = rows.len();
        let rows: Vec<RawRecord> = rows
            .into_iter()
            .filter(|row| {
                query.includes_marketplace(row.text(&self.marketplace_column).as_deref())
            })
            .filter(|row| self.within_lookback(row, query))
            .collect();

        tracing::info!(
            path = %self.path.display(),
            rows_read = read,
            rows_selected = rows.len(),
            lookback_minutes = query.lookback_minutes,
            marketplaces = ?query.marketplaces,
            "Fetched rows"
        );
        Ok(rows)
    }
}
