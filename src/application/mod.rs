// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case runs one pipeline end to end:
//
//   load records → fit/encode features → build model
//   → train → score every record → report
//
// No tensor math here and no argument parsing; printing of the
// per-record results is the only output.

use serde::{Deserialize, Serialize};

use crate::domain::prediction::Prediction;
use crate::ml::trainer::EpochMetrics;

/// Call-transcript classification (Pipeline A)
pub mod text_use_case;

/// Customer propensity scoring (Pipeline B)
pub mod tabular_use_case;

/// What a pipeline run produced: the loss history and one
/// prediction per input record, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub history:     Vec<EpochMetrics>,
    pub predictions: Vec<Prediction>,
}

impl RunReport {
    /// Fraction of records whose thresholded prediction matches the label.
    pub fn accuracy(&self, labels: &[u8]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let correct = self.predictions
            .iter()
            .zip(labels)
            .filter(|(p, &l)| p.label == l)
            .count();
        correct as f64 / labels.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let report = RunReport {
            history:     Vec::new(),
            predictions: vec![
                Prediction::from_logit(2.0),
                Prediction::from_logit(-2.0),
                Prediction::from_logit(0.1),
            ],
        };
        assert!((report.accuracy(&[1, 0, 0]) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.accuracy(&[]), 0.0);
    }
}
