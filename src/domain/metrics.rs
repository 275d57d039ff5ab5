//! Metric mappings supplied by data sources.
//!
//! A [`MetricMapping`] is the flat, per-symbol set of named values the
//! evaluator reads. Absent and null values are simply not present.

use crate::domain::field::Field;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Serializes as a bare JSON number or string. JSON has no NaN or infinity,
/// so non-finite numbers are written as their display text (`"NaN"`, `"inf"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            MetricValue::Number(n) => serializer.collect_str(n),
            MetricValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, MetricValue::Number(_))
    }

    /// Lower-cased textual form used by string comparisons.
    pub fn folded(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Number(value as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricMapping {
    pub symbol: String,
    #[serde(default)]
    pub values: BTreeMap<Field, MetricValue>,
}

impl MetricMapping {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert of a present value.
    pub fn with(mut self, field: Field, value: impl Into<MetricValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Sets or clears a value; `None` marks the metric as absent.
    pub fn set(&mut self, field: Field, value: Option<MetricValue>) {
        match value {
            Some(v) => {
                self.values.insert(field, v);
            }
            None => {
                self.values.remove(&field);
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&MetricValue> {
        self.values.get(&field)
    }

    /// Builds a mapping from raw string-keyed pairs. Keys outside the field
    /// catalog are ignored.
    pub fn from_pairs<'a, I>(symbol: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<MetricValue>)>,
    {
        let mut mapping = Self::new(symbol);
        for (key, value) in pairs {
            if let Some(field) = Field::from_key(key) {
                mapping.set(field, value);
            }
        }
        mapping
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
