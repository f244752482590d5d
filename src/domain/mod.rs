// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types shared by both pipelines:
//
//   record.rs     — raw inputs: a transcript or a customer row,
//                   each carrying a binary label
//   prediction.rs — logit / probability / thresholded label
//   error.rs      — typed failures (unseen categories, missing
//                   columns, shape mismatches, bad configs)
//   traits.rs     — where records come from
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums and traits

pub mod record;

pub mod prediction;

pub mod error;

pub mod traits;
