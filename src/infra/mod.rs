// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-backed concerns used by the use cases:
//
//   tokenizer_store.rs — load a tokenizer.json, or build a
//                        word-level one from the transcripts
//
//   pretrained.rs      — rebuild the transcript encoder from a
//                        model directory (config + Burn record)
//
//   metrics.rs         — per-epoch loss rows appended to a CSV
//
// Nothing here writes a trained model back to disk.

/// Tokenizer loading and building
pub mod tokenizer_store;

/// Pretrained transcript encoder loading
pub mod pretrained;

/// Training metrics CSV logger
pub mod metrics;
