// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure the pipelines can name precisely. The outer
// layers wrap these in anyhow::Error with extra context.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// A categorical value that was not present when the encoder was fit.
    #[error("column '{column}' has unseen category '{value}'")]
    UnseenCategory { column: String, value: String },

    #[error("row {row} is missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    #[error("column '{column}' expected a number in row {row}")]
    TypeMismatch { row: usize, column: String },

    /// Representation width does not match what a layer was built for.
    #[error("{what}: expected width {expected}, got {actual}")]
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    #[error("cannot {0} on an empty dataset")]
    EmptyDataset(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
