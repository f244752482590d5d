// ============================================================
// Layer 3 — Core Traits
// ============================================================
// RecordSource abstracts where labelled records come from:
//
//   - JsonRecordFile → a JSON array on disk
//   - BundledTranscripts / BundledCustomers → built-in examples
//
// The use cases only see RecordSource<T>, so either can feed
// a pipeline without changes.

use anyhow::Result;

pub trait RecordSource<T> {
    /// Load every record this source holds.
    fn load_all(&self) -> Result<Vec<T>>;
}
