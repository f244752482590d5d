// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw records and tensor batches.
//
// Pipeline A (transcripts):
//
//   TextRecord ─► Preprocessor ─► TextEncoder (tokenize, pad)
//              ─► TextDataset ─► TextBatcher ─► DataLoader
//
// Pipeline B (customer rows):
//
//   TabularRow ─► TabularEncoder (fit once, then transform)
//              ─► TabularDataset ─► TabularBatcher ─► DataLoader
//
// Encoders are fit once and frozen; every later transform is
// deterministic and fails loudly on values never seen at fit time.

/// JSON record files and the bundled example datasets
pub mod records;

/// Normalises transcript text before tokenisation
pub mod preprocessor;

/// Tokenised, padded transcript samples + Burn Dataset
pub mod text_dataset;

/// Stacks transcript samples into tensor batches
pub mod text_batcher;

/// Categorical encoders and continuous scalers
pub mod tabular_encoder;

/// Encoded customer rows + Burn Dataset
pub mod tabular_dataset;

/// Stacks encoded customer rows into tensor batches
pub mod tabular_batcher;
