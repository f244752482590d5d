// ============================================================
// Layer 4 — Record Sources
// ============================================================
// Two ways to get labelled records into a pipeline:
//
//   JsonRecordFile<T>  — a JSON array of TextRecord / TabularRow
//   Bundled*           — the small built-in example datasets used
//                        when no file is given on the command line
//
// Both implement the RecordSource trait from Layer 3.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{fs, marker::PhantomData, path::PathBuf};

use crate::domain::record::{CellValue, TabularRow, TabularSchema, TextRecord};
use crate::domain::traits::RecordSource;

/// Reads a JSON array of records from disk.
pub struct JsonRecordFile<T> {
    path:    PathBuf,
    _record: PhantomData<T>,
}

impl<T> JsonRecordFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), _record: PhantomData }
    }
}

impl<T: DeserializeOwned> RecordSource<T> for JsonRecordFile<T> {
    fn load_all(&self) -> Result<Vec<T>> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read records from '{}'", self.path.display()))?;

        let records: Vec<T> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed record file '{}'", self.path.display()))?;

        tracing::debug!("Loaded {} records from '{}'", records.len(), self.path.display());
        Ok(records)
    }
}

// ─── Bundled transcripts ─────────────────────────────────────────────────────
// Label 1 = the caller wants to buy / upgrade / stay; 0 = complaint or churn.
pub struct BundledTranscripts;

impl RecordSource<TextRecord> for BundledTranscripts {
    fn load_all(&self) -> Result<Vec<TextRecord>> {
        Ok(vec![
            TextRecord::new("Agent: thanks for calling. Customer: I'd love to upgrade to the premium plan today.", 1),
            TextRecord::new("Customer: this is the third time my service dropped, I want to cancel.", 0),
            TextRecord::new("Customer: the new router works great, can you add a second line for my son?", 1),
            TextRecord::new("Customer: I was charged twice and nobody called me back. Very disappointed.", 0),
            TextRecord::new("Agent: would you like the annual discount? Customer: yes please, sign me up.", 1),
            TextRecord::new("Customer: please close my account, I'm switching providers next week.", 0),
            TextRecord::new("Customer: happy with the support, I'll renew my contract.", 1),
            TextRecord::new("Customer: the technician never showed up and I'm still waiting.", 0),
        ])
    }
}

// ─── Bundled customers ───────────────────────────────────────────────────────
// Five rows, two categorical columns and two continuous columns.
pub struct BundledCustomers;

impl BundledCustomers {
    pub fn schema() -> TabularSchema {
        TabularSchema::new(
            vec!["gender".into(), "region".into()],
            vec!["age".into(), "income".into()],
        )
    }
}

impl RecordSource<TabularRow> for BundledCustomers {
    fn load_all(&self) -> Result<Vec<TabularRow>> {
        let row = |gender: &str, region: &str, age: f64, income: f64, label: u8| {
            TabularRow::new(
                [
                    ("gender", CellValue::from(gender)),
                    ("region", CellValue::from(region)),
                    ("age",    CellValue::from(age)),
                    ("income", CellValue::from(income)),
                ],
                label,
            )
        };

        Ok(vec![
            row("male",   "north", 25.0, 50_000.0, 0),
            row("female", "south", 30.0, 60_000.0, 1),
            row("female", "east",  35.0, 75_000.0, 1),
            row("male",   "west",  40.0, 80_000.0, 0),
            row("male",   "north", 45.0, 90_000.0, 1),
        ])
    }
}
