// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs a trained model on the inner (non-autodiff) backend and
// reads the logits back into Prediction rows. Dropout is inactive
// there, so scoring the same record twice gives the same result.

use std::sync::Arc;

use anyhow::Result;
use burn::{data::dataloader::DataLoader, prelude::*};

use crate::domain::prediction::Prediction;
use crate::ml::BinaryClassifier;

/// Score one batch: one Prediction per row, in batch order.
pub fn score<B, M, T>(model: &M, batch: &T) -> Result<Vec<Prediction>>
where
    B: Backend,
    M: BinaryClassifier<B, T>,
{
    let logits: Vec<f32> = model
        .forward_logits(batch)
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read logits back: {e:?}"))?;

    Ok(logits.into_iter().map(Prediction::from_logit).collect())
}

/// Score every batch a loader yields, concatenated in loader order.
pub fn score_all<B, M, T>(model: &M, loader: Arc<dyn DataLoader<T>>) -> Result<Vec<Prediction>>
where
    B: Backend,
    M: BinaryClassifier<B, T>,
{
    let mut predictions = Vec::new();
    for batch in loader.iter() {
        predictions.extend(score::<B, M, T>(model, &batch)?);
    }
    tracing::debug!("Scored {} records", predictions.len());
    Ok(predictions)
}
