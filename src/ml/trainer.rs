// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One loop for both pipelines. For each epoch, for each batch:
//
//   logits = model.forward_logits(batch)          [batch]
//   loss   = BCE-with-logits(logits, labels)
//   grads  = loss.backward()
//   model  = adam.step(lr, model, grads)
//
// and the mean batch loss is reported per epoch. There is no
// validation split, early stopping, checkpointing or LR schedule.
// A NaN/Inf loss is logged but not stopped.

use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    nn::loss::BinaryCrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::ml::{BinaryClassifier, LabelledBatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub lr:     f64,
}

/// Loss summary for one epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:    usize,
    /// Mean of the per-batch losses; NaN if the epoch saw no batches.
    pub avg_loss: f64,
    pub batches:  usize,
    pub samples:  usize,
}

pub struct TrainingOutcome<M> {
    pub model:   M,
    pub history: Vec<EpochMetrics>,
}

pub fn fit_binary<B, M, T>(
    mut model: M,
    loader:    Arc<dyn DataLoader<T>>,
    cfg:       &TrainingConfig,
) -> TrainingOutcome<M>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + BinaryClassifier<B, T>,
    T: LabelledBatch<B>,
{
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init::<B, M>();

    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut samples  = 0usize;

        for batch in loader.iter() {
            let labels = batch.labels();
            samples += labels.dims()[0];

            let logits  = model.forward_logits(&batch);
            let loss_fn = BinaryCrossEntropyLossConfig::new()
                .with_logits(true)
                .init(&logits.device());
            let loss = loss_fn.forward(logits, labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                tracing::warn!("Non-finite loss {} at epoch {} batch {}", loss_val, epoch, batches + 1);
            }
            loss_sum += loss_val;
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let metrics  = EpochMetrics { epoch, avg_loss, batches, samples };

        println!(
            "Epoch {:>3}/{} | loss={:.4} | batches={} | samples={}",
            epoch, cfg.epochs, avg_loss, batches, samples,
        );
        tracing::debug!("{:?}", metrics);
        history.push(metrics);
    }

    TrainingOutcome { model, history }
}
