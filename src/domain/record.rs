// ============================================================
// Layer 3 — Raw Records
// ============================================================
// The two kinds of labelled input the system accepts:
//
//   TextRecord  — one call transcript, label 1 = positive intent
//   TabularRow  — one customer, a map of column name → value,
//                 label 1 = took the target action
//
// CellValue is untagged so a JSON row like
//   {"values": {"region": "north", "age": 34}, "label": 1}
// deserialises without any type annotations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One labelled transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    pub text:  String,
    pub label: u8,
}

impl TextRecord {
    pub fn new(text: impl Into<String>, label: u8) -> Self {
        Self { text: text.into(), label }
    }
}

/// A single cell of a tabular row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Key used by categorical encoders. Numbers are categorised by
    /// their display form so `3` and `3.0` stay distinct only if the
    /// source data distinguishes them.
    pub fn category_key(&self) -> String {
        match self {
            CellValue::Text(s)   => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_)   => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self { CellValue::Text(s.to_string()) }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self { CellValue::Number(n) }
}

/// One labelled customer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularRow {
    pub values: BTreeMap<String, CellValue>,
    pub label:  u8,
}

impl TabularRow {
    /// Build a row from (column, value) pairs.
    ///
    /// Example:
    ///   TabularRow::new([("region", "north".into()), ("age", 34.0.into())], 1)
    pub fn new<I, K>(values: I, label: u8) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            label,
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }
}

/// Which columns of a row feed the embedding tables and which feed
/// the continuous projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularSchema {
    pub categorical: Vec<String>,
    pub continuous:  Vec<String>,
}

impl TabularSchema {
    pub fn new(categorical: Vec<String>, continuous: Vec<String>) -> Self {
        Self { categorical, continuous }
    }

    pub fn num_categorical(&self) -> usize { self.categorical.len() }

    pub fn num_continuous(&self) -> usize { self.continuous.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_untagged_json() {
        let row: TabularRow = serde_json::from_str(
            r#"{"values": {"region": "north", "age": 34}, "label": 1}"#,
        ).unwrap();
        assert_eq!(row.get("region"), Some(&CellValue::Text("north".into())));
        assert_eq!(row.get("age").and_then(CellValue::as_number), Some(34.0));
        assert_eq!(row.label, 1);
    }

    #[test]
    fn test_category_key_for_numbers() {
        assert_eq!(CellValue::Number(3.0).category_key(), "3");
        assert_eq!(CellValue::Text("gold".into()).category_key(), "gold");
    }
}
