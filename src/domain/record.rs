//! Raw tabular rows as handed over by the data source
//!
//! A [`RawRecord`] is an ordered mapping of column names to loosely-typed
//! [`FieldValue`]s. Records only live for one transformation pass.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;

static NULL: FieldValue = FieldValue::Null;

/// One loosely-typed cell value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum FieldValue {
    /// SQL NULL or a missing column
    Null,
    /// Text value, untrimmed
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value (NaN counts as blank)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Timestamp carrying an explicit offset
    Timestamp(DateTime<FixedOffset>),
    /// Timestamp without timezone information
    NaiveTimestamp(NaiveDateTime),
}

impl FieldValue {
    /// Null, NaN, or text that is empty after trimming
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Float(f) => !f.is_finite(),
            _ => false,
        }
    }

    /// Trimmed textual rendering, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        let text = match self {
            FieldValue::Null => return None,
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::Secs, false),
            FieldValue::NaiveTimestamp(ts) => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        Some(text)
    }

    /// Integer view of the value
    ///
    /// Accepts integers, integral floats and numeric text such as `"3"` or `"3.0"`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(f) => integral_float(*f),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>().ok().and_then(integral_float)
                })
            }
            _ => None,
        }
    }
}

/// Whole floats that fit in `i64`; anything else would saturate on cast
fn integral_float(f: f64) -> Option<i64> {
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    (in_range && f.fract() == 0.0).then_some(f as i64)
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::NaiveTimestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row from the data source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing an existing value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Value of a field; missing fields read as [`FieldValue::Null`]
    pub fn get(&self, name: &str) -> &FieldValue {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(&NULL)
    }

    /// Trimmed text of a field, `None` when missing or blank
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).as_text()
    }

    /// Text of an identifier field, or `unknown`
    pub fn id_or_unknown(&self, name: &str) -> String {
        self.text(name).unwrap_or_else(|| "unknown".to_string())
    }

    /// Field names in source order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a record from a JSON object, keeping key order
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::Text("   ".to_string()).is_blank());
        assert!(FieldValue::Float(f64::NAN).is_blank());
        assert!(!FieldValue::Integer(0).is_blank());
        assert!(!FieldValue::Text(" x ".to_string()).is_blank());
    }

    #[test]
    fn test_as_text_trims_and_renders_numbers() {
        assert_eq!(FieldValue::from("  A1 ").as_text().as_deref(), Some("A1"));
        assert_eq!(FieldValue::Integer(42).as_text().as_deref(), Some("42"));
        assert_eq!(FieldValue::Float(7.0).as_text().as_deref(), Some("7"));
        assert_eq!(FieldValue::Null.as_text(), None);
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(FieldValue::Integer(3).as_i64(), Some(3));
        assert_eq!(FieldValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(FieldValue::Float(3.5).as_i64(), None);
        assert_eq!(FieldValue::from("4").as_i64(), Some(4));
        assert_eq!(FieldValue::from("4.0").as_i64(), Some(4));
        assert_eq!(FieldValue::from("four").as_i64(), None);
    }

    #[test]
    fn test_as_i64_rejects_floats_outside_integer_range() {
        assert_eq!(FieldValue::Float(1e30).as_i64(), None);
        assert_eq!(FieldValue::Float(-1e30).as_i64(), None);
        assert_eq!(FieldValue::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(FieldValue::from("1e30").as_i64(), None);
    }

    #[test]
    fn test_record_missing_field_is_null() {
        let record = RawRecord::new().with("order_id", "A1");
        assert_eq!(record.get("status"), &FieldValue::Null);
        assert_eq!(record.id_or_unknown("status"), "unknown");
        assert_eq!(record.id_or_unknown("order_id"), "A1");
    }

    #[test]
    fn test_record_insert_replaces() {
        let mut record = RawRecord::new().with("a", 1).with("b", 2);
        record.insert("a", 3);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), &FieldValue::Integer(3));
    }

    #[test]
    fn test_record_from_json_keeps_order() {
        let record = RawRecord::from_json(json!({"z": 1, "a": null, "m": "x"})).unwrap();
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["z", "a", "m"]);
        assert!(record.get("a").is_blank());
        assert!(RawRecord::from_json(json!([1, 2])).is_none());
    }
}
