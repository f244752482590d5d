// ============================================================
// Layer 3 — Prediction
// ============================================================
// The output of both pipelines for one record:
//
//   logit       — raw head output, unbounded
//   probability — sigmoid(logit), always in [0, 1]
//   label       — 1 when probability >= 0.5, else 0

use serde::{Deserialize, Serialize};

/// Decision boundary shared by both pipelines.
pub const DECISION_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub logit:       f32,
    pub probability: f32,
    pub label:       u8,
}

impl Prediction {
    pub fn from_logit(logit: f32) -> Self {
        let probability = sigmoid(logit);
        Self { logit, probability, label: threshold(probability) }
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Map a probability to a discrete label.
pub fn threshold(probability: f32) -> u8 {
    if probability >= DECISION_THRESHOLD { 1 } else { 0 }
}
